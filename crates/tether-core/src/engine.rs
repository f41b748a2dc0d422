//! The contract an external popover engine must satisfy.
//!
//! The engine owns positioning math, show/hide animation, and display of
//! the popper tree; the binding layer owns nothing but lifecycle.  Engines
//! are supplied by constructor injection — there is no global registry and
//! no module-level engine swap.  Everything here is single-threaded: trait
//! methods take `&self` and implementations are expected to use interior
//! mutability, matching the cooperative commit model of the binding layer.

use std::rc::Rc;

use crate::error::BindError;
use crate::node::Element;
use crate::props::EngineProps;

/// One live, positioned, showable/hidable popover.
///
/// Handles are exclusively owned by the binding instance that created them.
/// A singleton aggregate only ever holds non-owning references to member
/// handles and never destroys them independently.
pub trait PopoverHandle {
    /// Push a new configuration snapshot.
    ///
    /// Callers are expected to pass a snapshot already run through
    /// [`merge_props`](crate::props::merge_props) so that engine-appended
    /// substructure survives the push.
    fn set_props(&self, props: EngineProps);

    /// The currently-recorded configuration, including anything the engine
    /// appended at runtime.
    fn props(&self) -> EngineProps;

    fn show(&self);
    fn hide(&self);
    fn enable(&self);
    fn disable(&self);

    /// Tear the popover down.
    ///
    /// Must be safe to call at any point of the engine's internal state
    /// machine, including mid-animation, and must be idempotent.
    fn destroy(&self);

    fn is_destroyed(&self) -> bool;
    fn is_shown(&self) -> bool;
    fn is_enabled(&self) -> bool;

    /// The rendered popover root, for class-token injection.
    fn popper(&self) -> Element;

    /// The trigger element this handle is anchored to.
    fn reference(&self) -> Element;
}

/// An aggregate popover presented on behalf of multiple member handles.
pub trait SingletonHandle {
    fn set_props(&self, props: EngineProps);
    fn props(&self) -> EngineProps;

    /// Replace the member list incrementally, without tearing the aggregate
    /// down.  The engine must never observe a partially-updated list; the
    /// coordinator prunes destroyed members before every call.
    fn set_instances(&self, members: &[Rc<dyn PopoverHandle>]);

    /// The current member list, in registration order.
    fn instances(&self) -> Vec<Rc<dyn PopoverHandle>>;

    fn show(&self);
    fn hide(&self);
    fn enable(&self);
    fn disable(&self);

    /// Idempotent teardown of the aggregate only — member handles stay
    /// alive and remain owned by their binding instances.
    fn destroy(&self);

    fn is_destroyed(&self) -> bool;
    fn is_shown(&self) -> bool;
    fn is_enabled(&self) -> bool;

    /// The aggregate's rendered root.
    fn popper(&self) -> Element;
}

/// Factory for popover handles and singleton aggregates.
pub trait PopoverEngine {
    type Handle: PopoverHandle + 'static;
    type Singleton: SingletonHandle + 'static;

    /// Create a popover bound to `trigger`.
    ///
    /// Implementations may refuse (configuration the engine cannot honor,
    /// an unusable trigger); the binding layer surfaces that as
    /// [`BindError::Engine`].
    fn create(&self, trigger: &Element, props: EngineProps) -> Result<Rc<Self::Handle>, BindError>;

    /// Create an aggregate wrapping `members`.
    ///
    /// `overrides` names the configuration keys an active member may
    /// override per activation; everything else comes from `props`.
    fn create_singleton(
        &self,
        members: Vec<Rc<dyn PopoverHandle>>,
        props: EngineProps,
        overrides: &[String],
    ) -> Result<Rc<Self::Singleton>, BindError>;
}
