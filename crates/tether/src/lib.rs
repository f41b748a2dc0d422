//! **tether** -- a declarative binding layer for imperative tooltip/popover
//! engines.
//!
//! This is the umbrella crate that re-exports everything you need from a
//! single dependency:
//!
//! ```toml
//! [dependencies]
//! tether = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`tether_core`] are available at the crate root
//!   ([`Element`], [`EngineConfig`], [`PopoverEngine`], [`PopoverHandle`],
//!   [`BindError`], the [`testing`] engine, etc.).
//! * The [`widgets`] module re-exports everything from [`tether_widgets`]
//!   ([`Popover`](widgets::Popover), the [`singleton`](widgets::singleton)
//!   coordinator, [`Portal`](widgets::Portal)).
//! * [`tracing`] is re-exported so downstream crates do not need to depend
//!   on it directly.
//!
//! # Quick start
//!
//! ```ignore
//! use std::rc::Rc;
//! use tether::testing::TestEngine;
//! use tether::widgets::{Popover, PopoverProps};
//! use tether::Element;
//!
//! let engine = Rc::new(TestEngine::new());
//! let trigger = Element::new("button");
//!
//! let props = PopoverProps::new("Saved!").class_name("toast");
//! let mut popover = Popover::new(engine, props.clone());
//! popover.render(Some(&trigger), props)?;
//!
//! popover.handle().unwrap().show();
//! ```
//!
//! The engine behind the binding is anything implementing
//! [`PopoverEngine`]; the bundled [`testing::TestEngine`] drives the whole
//! layer headlessly for tests and demos.

pub use tether_core::*;
pub mod widgets {
    pub use tether_widgets::*;
}

// Re-export dependencies for use in examples and downstream crates
pub use tracing;
