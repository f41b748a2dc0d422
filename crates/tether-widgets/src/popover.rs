//! The popover binding component.
//!
//! [`Popover`] keeps exactly one external engine handle alive and configured
//! in lockstep with one trigger element, across the full
//! mount/update/unmount cycle.  The handle is an explicitly-owned resource:
//! acquired when the trigger first resolves, released on unmount and on
//! every exit path including drop.
//!
//! A render pass goes through [`Popover::render`].  The first pass with a
//! resolved trigger mounts; subsequent passes push the new configuration
//! into the live handle; a pass with a *different* trigger node tears the
//! whole instance down and recreates it, because the engine binds to one
//! concrete element.
//!
//! Within one update pass the ordering is fixed: configuration push, then
//! enabled/disabled reconciliation, then (controlled mode only) visibility
//! reconciliation.  Callers relying on `on_before_update`/`on_after_update`
//! may assume that sequence.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tether_core::engine::{PopoverEngine, PopoverHandle};
use tether_core::error::BindError;
use tether_core::node::Element;
use tether_core::props::{
    merge_props, Content, Delay, Duration, EngineConfig, EngineContent, EngineHooks, Placement,
    TriggerEvent,
};

use crate::class_name;
use crate::portal::Portal;

/// Callback receiving the live handle.
pub type HandleCallback = Rc<dyn Fn(&dyn PopoverHandle)>;
/// Plain notification callback.
pub type NotifyCallback = Rc<dyn Fn()>;

/// How visibility is driven.
///
/// Derived, never stored: a binding instance is controlled exactly when the
/// caller supplies an explicit `visible` flag, which turns off the engine's
/// own interaction triggers and makes the caller responsible for every
/// show/hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityMode {
    Controlled,
    Autonomous,
}

/// Declared properties of a [`Popover`].
///
/// Rebuilt by the caller on every render pass, like any other declarative
/// configuration.  Engine options live in [`PopoverProps::config`];
/// everything else is handled by the binding layer and never forwarded.
///
/// # Example
///
/// ```rust,ignore
/// use tether_widgets::PopoverProps;
/// use tether_core::Placement;
///
/// let props = PopoverProps::new("Saved!")
///     .class_name("toast success")
///     .placement(Placement::Bottom)
///     .interactive(true);
/// ```
#[derive(Clone)]
pub struct PopoverProps {
    pub content: Content,
    /// Class tokens applied to the engine's rendered root (text content
    /// only).
    pub class_name: Option<String>,
    /// Explicit visibility override.  `Some(_)` switches the instance into
    /// controlled mode.
    pub visible: Option<bool>,
    pub enabled: bool,
    /// Defer rendering the popover body until the first show.
    pub lazy_render: bool,
    pub config: EngineConfig,
    pub on_create: Option<HandleCallback>,
    pub on_before_update: Option<HandleCallback>,
    pub on_after_update: Option<HandleCallback>,
    pub on_show: Option<NotifyCallback>,
    pub on_hidden: Option<NotifyCallback>,
}

impl PopoverProps {
    pub fn new(content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
            class_name: None,
            visible: None,
            enabled: true,
            lazy_render: false,
            config: EngineConfig::default(),
            on_create: None,
            on_before_update: None,
            on_after_update: None,
            on_show: None,
            on_hidden: None,
        }
    }

    pub fn content(mut self, content: impl Into<Content>) -> Self {
        self.content = content.into();
        self
    }

    pub fn class_name(mut self, names: impl Into<String>) -> Self {
        self.class_name = Some(names.into());
        self
    }

    /// Switch into controlled mode with the given visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn lazy_render(mut self) -> Self {
        self.lazy_render = true;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.config.placement = placement;
        self
    }

    pub fn triggers(mut self, triggers: Vec<TriggerEvent>) -> Self {
        self.config.triggers = Some(triggers);
        self
    }

    pub fn delay(mut self, delay: Delay) -> Self {
        self.config.delay = delay;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.config.interactive = interactive;
        self
    }

    pub fn hide_on_click(mut self, hide_on_click: bool) -> Self {
        self.config.hide_on_click = Some(hide_on_click);
        self
    }

    pub fn offset(mut self, skidding: i32, distance: i32) -> Self {
        self.config.offset = (skidding, distance);
        self
    }

    /// Pass an engine plugin name straight through.
    pub fn plugin(mut self, name: impl Into<String>) -> Self {
        self.config.plugins.push(name.into());
        self
    }

    /// Pass an engine-specific option with no named field.
    pub fn engine_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.extra.insert(key.into(), value);
        self
    }

    pub fn on_create(mut self, f: impl Fn(&dyn PopoverHandle) + 'static) -> Self {
        self.on_create = Some(Rc::new(f));
        self
    }

    pub fn on_before_update(mut self, f: impl Fn(&dyn PopoverHandle) + 'static) -> Self {
        self.on_before_update = Some(Rc::new(f));
        self
    }

    pub fn on_after_update(mut self, f: impl Fn(&dyn PopoverHandle) + 'static) -> Self {
        self.on_after_update = Some(Rc::new(f));
        self
    }

    pub fn on_show(mut self, f: impl Fn() + 'static) -> Self {
        self.on_show = Some(Rc::new(f));
        self
    }

    pub fn on_hidden(mut self, f: impl Fn() + 'static) -> Self {
        self.on_hidden = Some(Rc::new(f));
        self
    }

    /// The visibility mode these props imply.
    pub fn visibility_mode(&self) -> VisibilityMode {
        if self.visible.is_some() {
            VisibilityMode::Controlled
        } else {
            VisibilityMode::Autonomous
        }
    }
}

impl std::fmt::Debug for PopoverProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopoverProps")
            .field("content", &self.content)
            .field("class_name", &self.class_name)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("lazy_render", &self.lazy_render)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

struct LazyState {
    shown: bool,
}

/// One binding instance: a trigger element, an engine handle, and the
/// portal container, kept in lockstep.
pub struct Popover<E: PopoverEngine> {
    engine: Rc<E>,
    props: PopoverProps,
    handle: Option<Rc<E::Handle>>,
    trigger: Option<Element>,
    portal: Portal,
    lazy: Rc<RefCell<LazyState>>,
    handle_slot: Rc<RefCell<Option<Weak<E::Handle>>>>,
    applied_class: Option<String>,
    mount_generation: u64,
    renders: u32,
}

impl<E: PopoverEngine> Popover<E> {
    /// Create an unmounted binding instance.  No engine call happens until
    /// the first [`render`](Popover::render).
    pub fn new(engine: Rc<E>, props: PopoverProps) -> Self {
        Self {
            engine,
            props,
            handle: None,
            trigger: None,
            portal: Portal::new(),
            lazy: Rc::new(RefCell::new(LazyState { shown: false })),
            handle_slot: Rc::new(RefCell::new(None)),
            applied_class: None,
            mount_generation: 0,
            renders: 0,
        }
    }

    /// Drive one render pass.
    ///
    /// Fails fast with [`BindError::MissingTrigger`] when the trigger
    /// reference is unresolved — a silent no-op would leave the caller
    /// believing a popover exists.  A changed trigger node forces full
    /// teardown and recreation against the new element.
    pub fn render(
        &mut self,
        trigger: Option<&Element>,
        props: PopoverProps,
    ) -> Result<(), BindError> {
        let trigger = trigger.ok_or(BindError::MissingTrigger)?;
        if self.trigger.as_ref().is_some_and(|t| !t.ptr_eq(trigger)) {
            self.unmount();
        }

        let had_conflict = controlled_conflict(&self.props);
        self.props = props;

        match self.handle.clone() {
            Some(handle) => {
                if controlled_conflict(&self.props) && !had_conflict {
                    warn_controlled_conflict();
                }
                self.update(&handle);
                Ok(())
            }
            None => self.mount(trigger.clone()),
        }
    }

    /// Tear the instance down.
    ///
    /// Idempotent, and safe after a partially-failed mount: a missing
    /// handle is simply nothing to release.
    pub fn unmount(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.destroy();
        }
        *self.handle_slot.borrow_mut() = None;
        self.portal.clear();
        self.portal.set_mounted(false);
        self.applied_class = None;
        self.trigger = None;
        self.renders = 0;
        self.lazy.borrow_mut().shown = false;
    }

    /// The live engine handle, if mounted.
    pub fn handle(&self) -> Option<Rc<E::Handle>> {
        self.handle.clone()
    }

    /// The live handle as a trait object, for singleton registration.
    pub fn handle_dyn(&self) -> Option<Rc<dyn PopoverHandle>> {
        self.handle
            .clone()
            .map(|h| h as Rc<dyn PopoverHandle>)
    }

    /// The portal's detached content container.
    pub fn container(&self) -> Element {
        self.portal.container()
    }

    pub fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    /// Incremented on every mount, i.e. each time the trigger element
    /// identity changes.
    pub fn mount_generation(&self) -> u64 {
        self.mount_generation
    }

    pub fn props(&self) -> &PopoverProps {
        &self.props
    }

    fn mount(&mut self, trigger: Element) -> Result<(), BindError> {
        if controlled_conflict(&self.props) {
            warn_controlled_conflict();
        }
        self.lazy.borrow_mut().shown = false;

        let controlled = self.props.visibility_mode() == VisibilityMode::Controlled;
        let snapshot = self
            .props
            .config
            .snapshot(self.engine_content(), self.hooks(), controlled);
        let handle = self.engine.create(&trigger, snapshot)?;

        *self.handle_slot.borrow_mut() = Some(Rc::downgrade(&handle));
        self.handle = Some(Rc::clone(&handle));
        self.trigger = Some(trigger);
        self.mount_generation += 1;

        let next_class = class_name::effective(self.props.class_name.as_deref(), &self.props.content);
        if next_class.is_some() {
            class_name::swap(&handle.popper(), None, next_class.as_deref());
        }
        self.applied_class = next_class;

        if let Some(on_create) = &self.props.on_create {
            on_create(&*handle);
        }
        if !self.props.enabled {
            handle.disable();
        }
        if controlled && self.props.visible == Some(true) {
            handle.show();
        }

        self.portal.set_mounted(true);
        self.project();
        self.renders = 1;
        Ok(())
    }

    fn update(&mut self, handle: &Rc<E::Handle>) {
        let controlled = self.props.visibility_mode() == VisibilityMode::Controlled;
        let current = handle.props();
        let declared = self
            .props
            .config
            .snapshot(self.engine_content(), self.hooks(), controlled);
        let merged = merge_props(&current, &declared);

        let next_class = class_name::effective(self.props.class_name.as_deref(), &self.props.content);
        let class_changed = next_class.as_deref() != self.applied_class.as_deref();

        // The pass right after the mount is the stabilizing one: pushing an
        // unchanged configuration again would be redundant.
        let first_stabilizing = self.renders == 1;
        self.renders = self.renders.saturating_add(1);

        if !first_stabilizing || !merged.config_eq(&current) || class_changed {
            let popper = handle.popper();
            class_name::swap(&popper, self.applied_class.as_deref(), None);
            if let Some(on_before_update) = &self.props.on_before_update {
                on_before_update(&**handle);
            }
            handle.set_props(merged);
            if let Some(on_after_update) = &self.props.on_after_update {
                on_after_update(&**handle);
            }
            class_name::swap(&popper, None, next_class.as_deref());
            self.applied_class = next_class;
        }

        if self.props.enabled {
            handle.enable();
        } else {
            handle.disable();
        }

        if controlled {
            match self.props.visible {
                Some(true) => handle.show(),
                Some(false) => handle.hide(),
                None => {}
            }
        }

        self.project();
    }

    fn lazy_active(&self) -> bool {
        self.props.lazy_render && self.props.visible.is_none()
    }

    fn engine_content(&self) -> EngineContent {
        match &self.props.content {
            Content::Element(_) => EngineContent::Container(self.portal.container()),
            Content::Text(text) => {
                if self.lazy_active() && !self.lazy.borrow().shown {
                    EngineContent::None
                } else {
                    EngineContent::Text(text.clone())
                }
            }
        }
    }

    fn project(&mut self) {
        if self.lazy_active() && !self.lazy.borrow().shown {
            self.portal.clear();
            return;
        }
        let content = self.props.content.clone();
        self.portal.project(&content);
    }

    /// Engine-facing hooks for the next snapshot.
    ///
    /// Rebuilt every pass; they carry the lazy-render bookkeeping and
    /// forward to the caller's `on_show`/`on_hidden`.
    fn hooks(&self) -> EngineHooks {
        let lazy_active = self.lazy_active();

        let on_show = {
            let lazy = Rc::clone(&self.lazy);
            let slot = Rc::clone(&self.handle_slot);
            let container = self.portal.container();
            let content = self.props.content.clone();
            let user = self.props.on_show.clone();
            Rc::new(move |_reference: &Element| {
                if lazy_active {
                    let first = {
                        let mut state = lazy.borrow_mut();
                        let first = !state.shown;
                        state.shown = true;
                        first
                    };
                    if first {
                        match &content {
                            Content::Element(el) => {
                                container.set_text("");
                                container.clear_children();
                                container.append_child(el);
                            }
                            Content::Text(text) => {
                                let handle = slot.borrow().as_ref().and_then(Weak::upgrade);
                                if let Some(handle) = handle {
                                    let mut props = handle.props();
                                    props.content = EngineContent::Text(text.clone());
                                    handle.set_props(props);
                                }
                            }
                        }
                    }
                }
                if let Some(user) = &user {
                    user();
                }
            }) as Rc<dyn Fn(&Element)>
        };

        let on_hidden = {
            let lazy = Rc::clone(&self.lazy);
            let slot = Rc::clone(&self.handle_slot);
            let container = self.portal.container();
            let content = self.props.content.clone();
            let user = self.props.on_hidden.clone();
            Rc::new(move |_reference: &Element| {
                if lazy_active {
                    lazy.borrow_mut().shown = false;
                    match &content {
                        Content::Element(_) => {
                            container.set_text("");
                            container.clear_children();
                        }
                        Content::Text(_) => {
                            let handle = slot.borrow().as_ref().and_then(Weak::upgrade);
                            if let Some(handle) = handle {
                                let mut props = handle.props();
                                props.content = EngineContent::None;
                                handle.set_props(props);
                            }
                        }
                    }
                }
                if let Some(user) = &user {
                    user();
                }
            }) as Rc<dyn Fn(&Element)>
        };

        EngineHooks {
            on_show: Some(on_show),
            on_hidden: Some(on_hidden),
            on_trigger: None,
        }
    }
}

impl<E: PopoverEngine> Drop for Popover<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn controlled_conflict(props: &PopoverProps) -> bool {
    props.visible.is_some()
        && (props.config.triggers.is_some() || props.config.hide_on_click.is_some())
}

fn warn_controlled_conflict() {
    tracing::warn!(
        "trigger configuration is ignored in controlled visibility mode; \
         drive show/hide through the visible flag instead"
    );
}
