//! Binding components for the **tether** layer.
//!
//! `tether-widgets` builds on the contracts in `tether-core` and provides
//! the pieces an application composes: the popover binding component, the
//! singleton coordinator for groups sharing one popover, and the content
//! portal.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Popover`] | One trigger, one engine handle, full lifecycle sync |
//! | [`PopoverProps`] | Declared popover configuration, rebuilt per render pass |
//! | [`VisibilityMode`] | Controlled (caller-driven) vs autonomous visibility |
//! | [`singleton`] | Build a [`SingletonSource`]/[`SingletonTarget`] pair |
//! | [`SingletonSource`] | Owns the aggregate handle shared by a group |
//! | [`SingletonTarget`] | Registration half handed to the members |
//! | [`Portal`] | Projects element content into a detached container |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use tether_core::{testing::TestEngine, Element};
//! use tether_widgets::{Popover, PopoverProps};
//!
//! let engine = Rc::new(TestEngine::new());
//! let trigger = Element::new("button");
//! let props = PopoverProps::new("Saved!").class_name("toast");
//! let mut popover = Popover::new(engine, props.clone());
//! popover.render(Some(&trigger), props)?;
//! ```

mod class_name;
pub mod popover;
pub mod portal;
pub mod singleton;

pub use popover::{HandleCallback, NotifyCallback, Popover, PopoverProps, VisibilityMode};
pub use portal::Portal;
pub use singleton::{singleton, SingletonCallback, SingletonProps, SingletonSource, SingletonTarget};
