//! The singleton coordinator: many triggers, one shared popover.
//!
//! A group is built from two halves returned by [`singleton`].  The
//! [`SingletonTarget`] is handed to the binding components (or any other
//! handle owner); each registers its live handle plus the content to show
//! when its trigger fires.  The [`SingletonSource`] owns the aggregate
//! engine handle and, on every render pass, re-filters the member list for
//! liveness and pushes membership and configuration changes into the
//! engine.
//!
//! Member handles never show their own popover: registration disables them,
//! and the engine routes their trigger events to the aggregate instead.
//! When a member trigger fires, the coordinator swaps that member's content
//! into the shared container before the aggregate shows.
//!
//! Members are held weakly.  A dropped or destroyed member disappears from
//! the group on the next pass with no unregistration call; the liveness
//! filter runs before every use of the list, so even within one pass a
//! stale member is never handed to the engine.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tether_core::engine::{PopoverEngine, PopoverHandle, SingletonHandle};
use tether_core::error::BindError;
use tether_core::node::Element;
use tether_core::props::{
    merge_props, Content, Delay, Duration, EngineConfig, EngineContent, EngineHooks, Placement,
};

use crate::class_name;

/// Callback receiving the live aggregate handle.
pub type SingletonCallback = Rc<dyn Fn(&dyn SingletonHandle)>;

/// Declared properties of a [`SingletonSource`].
///
/// `overrides` names the per-member option keys the engine lets an active
/// member override on the aggregate; everything else comes from the shared
/// configuration here.
#[derive(Clone)]
pub struct SingletonProps {
    pub class_name: Option<String>,
    pub enabled: bool,
    pub overrides: Vec<String>,
    pub config: EngineConfig,
    pub on_create: Option<SingletonCallback>,
}

impl SingletonProps {
    pub fn new() -> Self {
        Self {
            class_name: None,
            enabled: true,
            overrides: Vec::new(),
            config: EngineConfig {
                // member elements already carry their own attribute
                // configuration; the aggregate must not re-read it
                ignore_attributes: true,
                ..EngineConfig::default()
            },
            on_create: None,
        }
    }

    pub fn class_name(mut self, names: impl Into<String>) -> Self {
        self.class_name = Some(names.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Let the active member override these option keys on the aggregate.
    pub fn overrides(mut self, keys: Vec<String>) -> Self {
        self.overrides = keys;
        self
    }

    pub fn override_key(mut self, key: impl Into<String>) -> Self {
        self.overrides.push(key.into());
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

    pub fn delay(mut self, delay: Delay) -> Self {
        self.config.delay = delay;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    pub fn on_create(mut self, f: impl Fn(&dyn SingletonHandle) + 'static) -> Self {
        self.on_create = Some(Rc::new(f));
        self
    }
}

impl Default for SingletonProps {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SingletonProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonProps")
            .field("class_name", &self.class_name)
            .field("enabled", &self.enabled)
            .field("overrides", &self.overrides)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

struct Member {
    handle: Weak<dyn PopoverHandle>,
    content: Content,
}

struct Registry {
    members: Vec<Member>,
    registered: u64,
    source_mounted: bool,
    active: Option<usize>,
}

impl Registry {
    /// Drop members whose handle is gone or destroyed.
    fn prune(&mut self) {
        self.members
            .retain(|m| m.handle.upgrade().is_some_and(|h| !h.is_destroyed()));
    }

    fn live(&self) -> Vec<Rc<dyn PopoverHandle>> {
        self.members
            .iter()
            .filter_map(|m| m.handle.upgrade())
            .collect()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if self.registered > 0 && !self.source_mounted {
            tracing::error!(
                registered = self.registered,
                "singleton target collected members but no source was ever rendered; \
                 the shared popover never existed"
            );
        }
    }
}

/// The registration half of a singleton group.  Cheap to clone.
#[derive(Clone)]
pub struct SingletonTarget {
    registry: Rc<RefCell<Registry>>,
}

impl SingletonTarget {
    /// Register a live member handle and the content to show when its
    /// trigger fires.
    ///
    /// The member is disabled immediately: its trigger events belong to the
    /// aggregate from here on.
    pub fn register(&self, handle: Rc<dyn PopoverHandle>, content: impl Into<Content>) {
        handle.disable();
        let mut registry = self.registry.borrow_mut();
        registry.members.push(Member {
            handle: Rc::downgrade(&handle),
            content: content.into(),
        });
        registry.registered += 1;
    }

    /// Number of currently live members.
    pub fn len(&self) -> usize {
        let mut registry = self.registry.borrow_mut();
        registry.prune();
        registry.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The rendering half of a singleton group: owns the aggregate handle.
pub struct SingletonSource<E: PopoverEngine> {
    engine: Rc<E>,
    props: SingletonProps,
    registry: Rc<RefCell<Registry>>,
    aggregate: Option<Rc<E::Singleton>>,
    container: Element,
    applied_class: Option<String>,
    member_ids: Vec<usize>,
    renders: u32,
}

/// Build a singleton group.
///
/// The source mounts lazily: no engine call happens until its first
/// [`render`](SingletonSource::render).
pub fn singleton<E: PopoverEngine>(
    engine: Rc<E>,
    props: SingletonProps,
) -> (SingletonSource<E>, SingletonTarget) {
    let registry = Rc::new(RefCell::new(Registry {
        members: Vec::new(),
        registered: 0,
        source_mounted: false,
        active: None,
    }));
    let source = SingletonSource {
        engine,
        props,
        registry: Rc::clone(&registry),
        aggregate: None,
        container: Element::new("div"),
        applied_class: None,
        member_ids: Vec::new(),
        renders: 0,
    };
    (source, SingletonTarget { registry })
}

impl<E: PopoverEngine> SingletonSource<E> {
    /// Drive one render pass with new properties.
    pub fn render(&mut self, props: SingletonProps) -> Result<(), BindError> {
        self.props = props;
        self.pass()
    }

    /// Drive one render pass with the current properties, picking up
    /// membership changes.
    pub fn refresh(&mut self) -> Result<(), BindError> {
        self.pass()
    }

    /// Tear the aggregate down.  Members stay registered and a later render
    /// recreates the aggregate around the survivors.
    pub fn unmount(&mut self) {
        if let Some(aggregate) = self.aggregate.take() {
            aggregate.destroy();
        }
        self.registry.borrow_mut().active = None;
        self.applied_class = None;
        self.member_ids.clear();
        self.renders = 0;
    }

    /// The live aggregate handle, if mounted.
    pub fn aggregate(&self) -> Option<Rc<E::Singleton>> {
        self.aggregate.clone()
    }

    /// The shared content container the active member's content is swapped
    /// into.
    pub fn container(&self) -> Element {
        self.container.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.aggregate.is_some()
    }

    pub fn props(&self) -> &SingletonProps {
        &self.props
    }

    /// Swap the member owning `reference` into the shared container, as the
    /// engine does when that member's trigger fires.
    pub fn activate(&self, reference: &Element) {
        activate_member(&self.registry, &self.container, reference);
    }

    fn pass(&mut self) -> Result<(), BindError> {
        let live = {
            let mut registry = self.registry.borrow_mut();
            registry.prune();
            registry.live()
        };
        let ids: Vec<usize> = live.iter().map(member_id).collect();

        let Some(aggregate) = self.aggregate.clone() else {
            return self.mount(live, ids);
        };

        if ids != self.member_ids {
            aggregate.set_instances(&live);
            self.member_ids = ids;
        }

        // pass right after the mount only stabilizes; nothing new to push
        if self.renders == 1 {
            self.renders = 2;
        } else {
            let current = aggregate.props();
            let declared = self.snapshot();
            let merged = merge_props(&current, &declared);
            let next_class = self.props.class_name.clone();
            let class_changed = next_class.as_deref() != self.applied_class.as_deref();
            if !merged.config_eq(&current) || class_changed {
                let popper = aggregate.popper();
                class_name::swap(&popper, self.applied_class.as_deref(), None);
                aggregate.set_props(merged);
                class_name::swap(&popper, None, next_class.as_deref());
                self.applied_class = next_class;
            }
        }

        if self.props.enabled {
            aggregate.enable();
        } else {
            aggregate.disable();
        }
        Ok(())
    }

    fn mount(&mut self, live: Vec<Rc<dyn PopoverHandle>>, ids: Vec<usize>) -> Result<(), BindError> {
        let snapshot = self.snapshot();
        let aggregate = self
            .engine
            .create_singleton(live, snapshot, &self.props.overrides)?;
        self.registry.borrow_mut().source_mounted = true;
        self.aggregate = Some(Rc::clone(&aggregate));
        self.member_ids = ids;

        let next_class = self.props.class_name.clone();
        if next_class.is_some() {
            class_name::swap(&aggregate.popper(), None, next_class.as_deref());
        }
        self.applied_class = next_class;

        if let Some(on_create) = &self.props.on_create {
            on_create(&*aggregate);
        }
        if !self.props.enabled {
            aggregate.disable();
        }
        self.renders = 1;
        Ok(())
    }

    fn snapshot(&self) -> tether_core::props::EngineProps {
        let registry = Rc::clone(&self.registry);
        let container = self.container.clone();
        let on_trigger = Rc::new(move |reference: &Element| {
            activate_member(&registry, &container, reference);
        }) as Rc<dyn Fn(&Element)>;

        self.props.config.snapshot(
            EngineContent::Container(self.container.clone()),
            EngineHooks {
                on_show: None,
                on_hidden: None,
                on_trigger: Some(on_trigger),
            },
            false,
        )
    }
}

impl<E: PopoverEngine> Drop for SingletonSource<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn member_id(handle: &Rc<dyn PopoverHandle>) -> usize {
    Rc::as_ptr(handle) as *const () as usize
}

fn activate_member(registry: &Rc<RefCell<Registry>>, container: &Element, reference: &Element) {
    let mut registry = registry.borrow_mut();
    registry.prune();

    let found = registry.members.iter().find_map(|m| {
        let handle = m.handle.upgrade()?;
        if handle.reference().ptr_eq(reference) {
            Some((member_id(&handle), m.content.clone()))
        } else {
            None
        }
    });
    let Some((id, content)) = found else {
        tracing::debug!("trigger fired for an element with no live member; ignoring");
        return;
    };
    if registry.active == Some(id) {
        return;
    }
    registry.active = Some(id);

    match content {
        Content::Text(text) => {
            container.clear_children();
            container.set_text(&text);
        }
        Content::Element(el) => {
            container.set_text("");
            container.clear_children();
            container.append_child(&el);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tether_core::testing::{EngineOp, TestEngine, TestHandle};

    fn engine() -> Rc<TestEngine> {
        Rc::new(TestEngine::new())
    }

    fn member(engine: &Rc<TestEngine>, tag: &str) -> (Element, Rc<TestHandle>) {
        let trigger = Element::new(tag);
        let props = EngineConfig::default().snapshot(
            EngineContent::Text(String::new()),
            EngineHooks::default(),
            false,
        );
        let handle = engine.create(&trigger, props).unwrap();
        (trigger, handle)
    }

    #[test]
    fn registration_disables_the_member() {
        let engine = engine();
        let (_source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (_trigger, handle) = member(&engine, "button");
        target.register(handle.clone(), "one");
        assert!(!handle.is_enabled());
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn activation_swaps_member_content_into_one_shared_root() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());

        let (first, h1) = member(&engine, "a");
        let (second, h2) = member(&engine, "b");
        let (third, h3) = member(&engine, "c");
        target.register(h1.clone(), "tip one");
        target.register(h2.clone(), "tip two");
        let body = Element::new("section");
        body.set_text("rich three");
        target.register(h3.clone(), body.clone());

        source.render(SingletonProps::new()).unwrap();
        let aggregate = source.aggregate().unwrap();

        let creates = engine
            .ops()
            .into_iter()
            .filter(|op| matches!(op, EngineOp::CreateSingleton { .. }))
            .count();
        assert_eq!(creates, 1);

        aggregate.fire(&second);
        assert_eq!(source.container().text(), "tip two");
        assert!(aggregate.is_shown());

        aggregate.fire(&first);
        assert_eq!(source.container().text(), "tip one");

        aggregate.fire(&third);
        assert!(source.container().text().is_empty());
        assert!(source.container().children()[0].ptr_eq(&body));
    }

    #[test]
    fn repeated_activation_of_the_same_member_is_a_no_op() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (trigger, handle) = member(&engine, "a");
        target.register(handle, "tip");
        source.render(SingletonProps::new()).unwrap();

        source.activate(&trigger);
        let probe = Element::new("probe");
        source.container().append_child(&probe);
        // same member again: the container must not be rebuilt
        source.activate(&trigger);
        assert_eq!(source.container().children().len(), 1);
    }

    #[test]
    fn dynamic_membership_leaves_exactly_the_survivors() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());

        let (_t1, h1) = member(&engine, "a");
        let (_t2, h2) = member(&engine, "b");
        let (_t3, h3) = member(&engine, "c");
        target.register(h1.clone(), "one");
        target.register(h2.clone(), "two");
        target.register(h3.clone(), "three");
        source.render(SingletonProps::new()).unwrap();
        assert_eq!(source.aggregate().unwrap().instances().len(), 3);

        // one destroyed, one newly registered
        h2.destroy();
        let (_t4, h4) = member(&engine, "d");
        target.register(h4.clone(), "four");
        source.refresh().unwrap();

        let ids: Vec<usize> = source
            .aggregate()
            .unwrap()
            .instances()
            .iter()
            .map(member_id)
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&thin_id(&h1)));
        assert!(!ids.contains(&thin_id(&h2)));
        assert!(ids.contains(&thin_id(&h4)));
    }

    fn thin_id(handle: &Rc<TestHandle>) -> usize {
        Rc::as_ptr(handle) as *const () as usize
    }

    /// Counts error-level events emitted while installed as the default
    /// subscriber.
    struct ErrorCount(Arc<AtomicUsize>);

    impl tracing::Subscriber for ErrorCount {
        fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _span: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }

        fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

        fn event(&self, event: &tracing::Event<'_>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn enter(&self, _span: &tracing::span::Id) {}

        fn exit(&self, _span: &tracing::span::Id) {}
    }

    #[test]
    fn dropped_member_popovers_disappear_without_unregistration() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (_t1, h1) = member(&engine, "a");
        target.register(h1.clone(), "one");
        {
            let trigger = Element::new("b");
            let props = crate::PopoverProps::new("two");
            let mut popover = crate::Popover::new(Rc::clone(&engine), props.clone());
            popover.render(Some(&trigger), props).unwrap();
            target.register(popover.handle_dyn().unwrap(), "two");
            source.render(SingletonProps::new()).unwrap();
            assert_eq!(source.aggregate().unwrap().instances().len(), 2);
        }
        // the popover dropped with its scope, destroying its handle
        source.refresh().unwrap();
        assert_eq!(source.aggregate().unwrap().instances().len(), 1);
        assert_eq!(target.len(), 1);
    }

    #[test]
    fn stabilizing_pass_pushes_nothing() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source.render(SingletonProps::new()).unwrap();
        source.render(SingletonProps::new()).unwrap();

        let ops = engine.ops();
        assert!(!ops.contains(&EngineOp::SingletonSetProps));
        assert!(!ops
            .iter()
            .any(|op| matches!(op, EngineOp::SetInstances { .. })));
    }

    #[test]
    fn later_passes_push_changed_configuration() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source.render(SingletonProps::new()).unwrap();
        source.render(SingletonProps::new()).unwrap();
        source
            .render(SingletonProps::new().placement(Placement::Bottom))
            .unwrap();

        let aggregate = source.aggregate().unwrap();
        assert_eq!(aggregate.props().placement, Placement::Bottom);
        assert!(engine.ops().contains(&EngineOp::SingletonSetProps));
    }

    #[test]
    fn class_name_lands_on_the_aggregate_popper() {
        let engine = engine();
        let (mut source, target) =
            singleton(Rc::clone(&engine), SingletonProps::new().class_name("a b"));
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source
            .render(SingletonProps::new().class_name("a b"))
            .unwrap();

        let popper = source.aggregate().unwrap().popper();
        assert_eq!(popper.class_list(), vec!["a", "b"]);

        source.render(SingletonProps::new()).unwrap();
        source
            .render(SingletonProps::new().class_name("c"))
            .unwrap();
        assert_eq!(popper.class_list(), vec!["c"]);
    }

    #[test]
    fn overrides_reach_the_engine() {
        let engine = engine();
        let props = SingletonProps::new().override_key("placement").override_key("delay");
        let (mut source, target) = singleton(Rc::clone(&engine), props.clone());
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source.render(props).unwrap();
        assert_eq!(
            source.aggregate().unwrap().overrides(),
            vec!["placement", "delay"]
        );
    }

    #[test]
    fn on_create_fires_once_with_the_aggregate() {
        let engine = engine();
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let props = SingletonProps::new().on_create(move |_| {
            calls_inner.set(calls_inner.get() + 1);
        });
        let (mut source, target) = singleton(Rc::clone(&engine), props.clone());
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source.render(props.clone()).unwrap();
        source.render(props).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unmount_destroys_the_aggregate_and_keeps_members() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (_t, h) = member(&engine, "a");
        target.register(h.clone(), "one");
        source.render(SingletonProps::new()).unwrap();
        let aggregate = source.aggregate().unwrap();

        source.unmount();
        source.unmount();
        assert!(aggregate.is_destroyed());
        assert_eq!(target.len(), 1);

        source.render(SingletonProps::new()).unwrap();
        assert!(source.is_mounted());
        assert_eq!(source.aggregate().unwrap().instances().len(), 1);
    }

    #[test]
    fn disabled_source_disables_the_aggregate() {
        let engine = engine();
        let props = SingletonProps::new().enabled(false);
        let (mut source, target) = singleton(Rc::clone(&engine), props.clone());
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source.render(props.clone()).unwrap();
        assert!(!source.aggregate().unwrap().is_enabled());

        source.render(props.enabled(true)).unwrap();
        assert!(source.aggregate().unwrap().is_enabled());
    }

    #[test]
    fn ignore_attributes_defaults_on_for_groups() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source.render(SingletonProps::new()).unwrap();
        assert!(source.aggregate().unwrap().props().ignore_attributes);
    }

    #[test]
    fn unwired_target_reports_an_error_on_teardown() {
        let errors = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(ErrorCount(Arc::clone(&errors)), || {
            let engine = engine();
            let (source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
            let (_t, h) = member(&engine, "a");
            target.register(h, "one");
            // the source is dropped without ever being rendered
            drop(source);
            drop(target);
        });
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rendered_group_tears_down_without_error() {
        let errors = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(ErrorCount(Arc::clone(&errors)), || {
            let engine = engine();
            let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
            let (_t, h) = member(&engine, "a");
            target.register(h, "one");
            source.render(SingletonProps::new()).unwrap();
            drop(source);
            drop(target);
        });
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_unused_group_tears_down_silently() {
        let errors = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(ErrorCount(Arc::clone(&errors)), || {
            let engine = engine();
            let (source, target) = singleton(engine, SingletonProps::new());
            drop(source);
            drop(target);
        });
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn snapshot_content_is_the_shared_container() {
        let engine = engine();
        let (mut source, target) = singleton(Rc::clone(&engine), SingletonProps::new());
        let (_t, h) = member(&engine, "a");
        target.register(h, "one");
        source.render(SingletonProps::new()).unwrap();
        match source.aggregate().unwrap().props().content {
            EngineContent::Container(c) => assert!(c.ptr_eq(&source.container())),
            other => panic!("expected container content, got {other:?}"),
        }
    }
}
