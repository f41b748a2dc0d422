//! Core contracts for the **tether** binding layer.
//!
//! `tether-core` defines everything the components in `tether-widgets` need
//! to keep a declaratively-managed tree and an imperatively-managed popover
//! engine in lockstep: the retained element tree, the configuration
//! snapshot and its merge rules, the engine contract, and a headless test
//! engine.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Element`] | Retained, reference-counted node; identity is pointer identity |
//! | [`EngineProps`] | Merged, framework-agnostic option set pushed into the engine |
//! | [`EngineConfig`] | Declared options, with an escape-hatch map for engine-specific ones |
//! | [`PopoverEngine`] | Factory contract an external engine implements |
//! | [`PopoverHandle`] | One live popover: show/hide/enable/disable/set-props/destroy |
//! | [`SingletonHandle`] | Aggregate popover over many member handles |
//! | [`TestEngine`](testing::TestEngine) | Recording engine for headless tests |
//!
//! # Threading
//!
//! The binding layer is single-threaded and synchronous by design: creation
//! and destruction run inside the host framework's commit phase, and the
//! engine's own animation scheduling is fire-and-forget from this layer's
//! perspective.  Nothing here is `Send`.

pub mod engine;
pub mod error;
pub mod node;
pub mod props;
pub mod testing;

pub use engine::{PopoverEngine, PopoverHandle, SingletonHandle};
pub use error::BindError;
pub use node::Element;
pub use props::{
    merge_props, Content, Delay, Duration, EngineConfig, EngineContent, EngineHooks, EngineProps,
    Placement, PositioningModifier, TriggerEvent,
};
