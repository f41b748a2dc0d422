//! A headless engine for driving the binding layer in plain `#[test]`
//! functions.
//!
//! [`TestEngine`] satisfies the full [`PopoverEngine`] contract without any
//! display layer: handles record every imperative call into a shared
//! operation log and expose their shown/enabled/destroyed state for
//! assertions.  The singleton aggregate can simulate a member trigger
//! firing with [`TestSingleton::fire`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::testing::{EngineOp, TestEngine};
//!
//! let engine = Rc::new(TestEngine::new());
//! let handle = engine.create(&trigger, props)?;
//! handle.show();
//! assert_eq!(engine.ops(), vec![
//!     EngineOp::Create { trigger: "button".into() },
//!     EngineOp::Show,
//! ]);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{PopoverEngine, PopoverHandle, SingletonHandle};
use crate::error::BindError;
use crate::node::Element;
use crate::props::{EngineProps, PositioningModifier};

/// One recorded imperative call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOp {
    Create { trigger: String },
    SetProps,
    Show,
    Hide,
    Enable,
    Disable,
    Destroy,
    CreateSingleton { members: usize },
    SetInstances { members: usize },
    SingletonSetProps,
    SingletonShow,
    SingletonHide,
    SingletonEnable,
    SingletonDisable,
    SingletonDestroy,
}

/// A recording popover engine with no display layer.
pub struct TestEngine {
    log: Rc<RefCell<Vec<EngineOp>>>,
    appended: RefCell<Option<PositioningModifier>>,
    fail_next_create: Cell<bool>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            appended: RefCell::new(None),
            fail_next_create: Cell::new(false),
        }
    }

    /// Append a positioning modifier to every created handle's recorded
    /// configuration, simulating engine-owned plumbing that a configuration
    /// push must not clobber.
    pub fn append_modifier(self, modifier: PositioningModifier) -> Self {
        *self.appended.borrow_mut() = Some(modifier);
        self
    }

    /// Make the next `create` call fail.
    pub fn fail_next_create(&self) {
        self.fail_next_create.set(true);
    }

    /// A snapshot of the operation log.
    pub fn ops(&self) -> Vec<EngineOp> {
        self.log.borrow().clone()
    }

    /// Take and clear the operation log.
    pub fn drain_ops(&self) -> Vec<EngineOp> {
        std::mem::take(&mut self.log.borrow_mut())
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

struct HandleState {
    props: EngineProps,
    shown: bool,
    enabled: bool,
    destroyed: bool,
}

/// A handle created by [`TestEngine`].
pub struct TestHandle {
    state: RefCell<HandleState>,
    popper: Element,
    reference: Element,
    log: Rc<RefCell<Vec<EngineOp>>>,
}

impl PopoverHandle for TestHandle {
    fn set_props(&self, props: EngineProps) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.props = props;
        }
        self.log.borrow_mut().push(EngineOp::SetProps);
    }

    fn props(&self) -> EngineProps {
        self.state.borrow().props.clone()
    }

    fn show(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed || !state.enabled || state.shown {
                return;
            }
            state.shown = true;
        }
        self.log.borrow_mut().push(EngineOp::Show);
        // borrow released above: the hook may call back into this handle
        let hook = self.state.borrow().props.hooks.on_show.clone();
        if let Some(hook) = hook {
            hook(&self.reference);
        }
    }

    fn hide(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed || !state.shown {
                return;
            }
            state.shown = false;
        }
        self.log.borrow_mut().push(EngineOp::Hide);
        let hook = self.state.borrow().props.hooks.on_hidden.clone();
        if let Some(hook) = hook {
            hook(&self.reference);
        }
    }

    fn enable(&self) {
        let mut state = self.state.borrow_mut();
        if state.destroyed || state.enabled {
            return;
        }
        state.enabled = true;
        self.log.borrow_mut().push(EngineOp::Enable);
    }

    fn disable(&self) {
        let mut state = self.state.borrow_mut();
        if state.destroyed || !state.enabled {
            return;
        }
        state.enabled = false;
        self.log.borrow_mut().push(EngineOp::Disable);
    }

    fn destroy(&self) {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return;
        }
        state.destroyed = true;
        state.shown = false;
        self.log.borrow_mut().push(EngineOp::Destroy);
    }

    fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    fn is_shown(&self) -> bool {
        self.state.borrow().shown
    }

    fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    fn popper(&self) -> Element {
        self.popper.clone()
    }

    fn reference(&self) -> Element {
        self.reference.clone()
    }
}

struct SingletonState {
    props: EngineProps,
    members: Vec<Rc<dyn PopoverHandle>>,
    overrides: Vec<String>,
    shown: bool,
    enabled: bool,
    destroyed: bool,
}

/// An aggregate handle created by [`TestEngine`].
pub struct TestSingleton {
    state: RefCell<SingletonState>,
    popper: Element,
    log: Rc<RefCell<Vec<EngineOp>>>,
}

impl TestSingleton {
    /// Simulate a member trigger firing for `reference`.
    ///
    /// Invokes the coordinator's activation hook, then shows the aggregate,
    /// the way a real engine would on a member interaction event.
    pub fn fire(&self, reference: &Element) {
        let hook = self.state.borrow().props.hooks.on_trigger.clone();
        if let Some(hook) = hook {
            hook(reference);
        }
        self.show();
    }

    /// The override keys declared at creation time.
    pub fn overrides(&self) -> Vec<String> {
        self.state.borrow().overrides.clone()
    }
}

impl SingletonHandle for TestSingleton {
    fn set_props(&self, props: EngineProps) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.props = props;
        }
        self.log.borrow_mut().push(EngineOp::SingletonSetProps);
    }

    fn props(&self) -> EngineProps {
        self.state.borrow().props.clone()
    }

    fn set_instances(&self, members: &[Rc<dyn PopoverHandle>]) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.members = members.to_vec();
        }
        self.log.borrow_mut().push(EngineOp::SetInstances {
            members: members.len(),
        });
    }

    fn instances(&self) -> Vec<Rc<dyn PopoverHandle>> {
        self.state.borrow().members.clone()
    }

    fn show(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed || !state.enabled || state.shown {
                return;
            }
            state.shown = true;
        }
        self.log.borrow_mut().push(EngineOp::SingletonShow);
    }

    fn hide(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.destroyed || !state.shown {
                return;
            }
            state.shown = false;
        }
        self.log.borrow_mut().push(EngineOp::SingletonHide);
    }

    fn enable(&self) {
        let mut state = self.state.borrow_mut();
        if state.destroyed || state.enabled {
            return;
        }
        state.enabled = true;
        self.log.borrow_mut().push(EngineOp::SingletonEnable);
    }

    fn disable(&self) {
        let mut state = self.state.borrow_mut();
        if state.destroyed || !state.enabled {
            return;
        }
        state.enabled = false;
        self.log.borrow_mut().push(EngineOp::SingletonDisable);
    }

    fn destroy(&self) {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return;
        }
        state.destroyed = true;
        state.shown = false;
        self.log.borrow_mut().push(EngineOp::SingletonDestroy);
    }

    fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    fn is_shown(&self) -> bool {
        self.state.borrow().shown
    }

    fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    fn popper(&self) -> Element {
        self.popper.clone()
    }
}

impl PopoverEngine for TestEngine {
    type Handle = TestHandle;
    type Singleton = TestSingleton;

    fn create(&self, trigger: &Element, props: EngineProps) -> Result<Rc<TestHandle>, BindError> {
        if self.fail_next_create.take() {
            return Err(BindError::Engine("test engine refused create".into()));
        }
        let mut props = props;
        if let Some(appended) = self.appended.borrow().clone() {
            if !props.modifiers.iter().any(|m| m.name == appended.name) {
                props.modifiers.push(appended);
            }
        }
        self.log.borrow_mut().push(EngineOp::Create {
            trigger: trigger.tag(),
        });
        Ok(Rc::new(TestHandle {
            state: RefCell::new(HandleState {
                props,
                shown: false,
                enabled: true,
                destroyed: false,
            }),
            popper: Element::new("popper"),
            reference: trigger.clone(),
            log: Rc::clone(&self.log),
        }))
    }

    fn create_singleton(
        &self,
        members: Vec<Rc<dyn PopoverHandle>>,
        props: EngineProps,
        overrides: &[String],
    ) -> Result<Rc<TestSingleton>, BindError> {
        self.log.borrow_mut().push(EngineOp::CreateSingleton {
            members: members.len(),
        });
        Ok(Rc::new(TestSingleton {
            state: RefCell::new(SingletonState {
                props,
                members,
                overrides: overrides.to_vec(),
                shown: false,
                enabled: true,
                destroyed: false,
            }),
            popper: Element::new("singleton-popper"),
            log: Rc::clone(&self.log),
        }))
    }
}
