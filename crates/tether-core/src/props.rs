//! Configuration snapshots and the pure merge that keeps them honest.
//!
//! A [`EngineProps`] value is the merged, framework-agnostic option set
//! pushed into the popover engine.  Snapshots are never mutated in place:
//! every update builds a fresh one and runs it through [`merge_props`], which
//! lets the declared options win while preserving any substructure the
//! engine itself appended at runtime (positioning modifiers, unrecognized
//! pass-through options).  Overwriting those would clobber engine-owned
//! plumbing state.
//!
//! The dynamic prop-bag of a typical binding layer is replaced here by an
//! explicit struct listing every recognized option by name, plus one
//! explicit escape-hatch map ([`EngineConfig::extra`]) for engine-specific
//! pass-through options.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::node::Element;

/// Content declared on a binding component.
///
/// Plain text travels inline inside the configuration snapshot; an element
/// subtree is projected through the portal into a detached container
/// instead, so it stays under the declaring side's control while the engine
/// displays it.
#[derive(Debug, Clone)]
pub enum Content {
    /// Plain text, handed directly to the engine.
    Text(String),
    /// A declarative element subtree, displayed via portal projection.
    Element(Element),
}

impl Content {
    /// Whether this is plain text content.
    pub fn is_text(&self) -> bool {
        matches!(self, Content::Text(_))
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Content::Text(a), Content::Text(b)) => a == b,
            (Content::Element(a), Content::Element(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_owned())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<Element> for Content {
    fn from(el: Element) -> Self {
        Content::Element(el)
    }
}

/// What the engine is told to display.
#[derive(Debug, Clone, Default)]
pub enum EngineContent {
    /// Nothing yet (lazily rendered content before its first show).
    #[default]
    None,
    /// Inline text.
    Text(String),
    /// A detached container element the portal projects into.
    Container(Element),
}

impl PartialEq for EngineContent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EngineContent::None, EngineContent::None) => true,
            (EngineContent::Text(a), EngineContent::Text(b)) => a == b,
            (EngineContent::Container(a), EngineContent::Container(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Preferred popover placement relative to the trigger.
///
/// Positioning math itself belongs to the engine; this is configuration
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
    /// Let the engine pick whichever side has room.
    Auto,
}

/// An interaction event that shows the popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    MouseEnter,
    Focus,
    Click,
    /// No engine-managed listeners; the caller drives visibility.
    Manual,
}

/// Show/hide delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delay {
    pub show: u64,
    pub hide: u64,
}

impl Delay {
    pub const fn new(show: u64, hide: u64) -> Self {
        Self { show, hide }
    }

    /// The same delay for both directions.
    pub const fn both(ms: u64) -> Self {
        Self { show: ms, hide: ms }
    }
}

/// Show/hide animation durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub show: u64,
    pub hide: u64,
}

impl Duration {
    pub const fn new(show: u64, hide: u64) -> Self {
        Self { show, hide }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self {
            show: 300,
            hide: 250,
        }
    }
}

/// One named positioning modifier.
///
/// Engines append their own modifiers to a live handle at runtime;
/// [`merge_props`] preserves those across configuration pushes unless the
/// declared snapshot names the same modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PositioningModifier {
    pub name: String,
    pub options: Value,
}

impl PositioningModifier {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// Engine-facing lifecycle hooks carried inside a snapshot.
///
/// These are wired by the binding layer, not by the consuming application:
/// the engine invokes them with the relevant reference element when it
/// shows or hides a popover, or when a member trigger of an aggregate
/// fires.
#[derive(Clone, Default)]
pub struct EngineHooks {
    pub on_show: Option<Rc<dyn Fn(&Element)>>,
    pub on_hidden: Option<Rc<dyn Fn(&Element)>>,
    pub on_trigger: Option<Rc<dyn Fn(&Element)>>,
}

impl fmt::Debug for EngineHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHooks")
            .field("on_show", &self.on_show.is_some())
            .field("on_hidden", &self.on_hidden.is_some())
            .field("on_trigger", &self.on_trigger.is_some())
            .finish()
    }
}

/// Declared engine options shared by the binding component and the
/// singleton coordinator.
///
/// All fields have defaults; use struct update syntax to override only what
/// you need:
///
/// ```rust,ignore
/// use tether_core::props::{EngineConfig, Placement};
///
/// let config = EngineConfig {
///     placement: Placement::Bottom,
///     interactive: true,
///     ..EngineConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub placement: Placement,
    /// Events that show the popover.  `None` means the engine default
    /// (mouse-enter and focus); declaring this in controlled visibility mode
    /// is a logged misuse.
    pub triggers: Option<Vec<TriggerEvent>>,
    pub delay: Delay,
    pub duration: Duration,
    /// Whether the popover itself accepts pointer interaction.
    pub interactive: bool,
    /// `None` means the engine default.
    pub hide_on_click: Option<bool>,
    /// Skip reading configuration from element attributes.
    pub ignore_attributes: bool,
    /// Skidding and distance, in the engine's units.
    pub offset: (i32, i32),
    /// Engine plugin names, passed straight through.
    pub plugins: Vec<String>,
    /// Caller-declared positioning modifiers.
    pub modifiers: Vec<PositioningModifier>,
    /// Escape hatch for engine-specific options with no named field.
    pub extra: BTreeMap<String, Value>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            triggers: None,
            delay: Delay::default(),
            duration: Duration::default(),
            interactive: false,
            hide_on_click: None,
            ignore_attributes: false,
            offset: (0, 10),
            plugins: Vec::new(),
            modifiers: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Build the full snapshot for this configuration.
    ///
    /// `controlled` replaces the declared trigger events with
    /// [`TriggerEvent::Manual`]: the engine must not manage its own
    /// show/hide when the caller drives visibility explicitly.
    pub fn snapshot(
        &self,
        content: EngineContent,
        hooks: EngineHooks,
        controlled: bool,
    ) -> EngineProps {
        let triggers = if controlled {
            vec![TriggerEvent::Manual]
        } else {
            self.triggers
                .clone()
                .unwrap_or_else(|| vec![TriggerEvent::MouseEnter, TriggerEvent::Focus])
        };
        EngineProps {
            content,
            placement: self.placement,
            triggers,
            delay: self.delay,
            duration: self.duration,
            interactive: self.interactive,
            hide_on_click: self.hide_on_click,
            ignore_attributes: self.ignore_attributes,
            offset: self.offset,
            plugins: self.plugins.clone(),
            modifiers: self.modifiers.clone(),
            extra: self.extra.clone(),
            hooks,
        }
    }
}

/// The merged, framework-agnostic option set pushed into the engine.
///
/// Built fresh on every render pass; never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct EngineProps {
    pub content: EngineContent,
    pub placement: Placement,
    pub triggers: Vec<TriggerEvent>,
    pub delay: Delay,
    pub duration: Duration,
    pub interactive: bool,
    pub hide_on_click: Option<bool>,
    pub ignore_attributes: bool,
    pub offset: (i32, i32),
    pub plugins: Vec<String>,
    pub modifiers: Vec<PositioningModifier>,
    pub extra: BTreeMap<String, Value>,
    pub hooks: EngineHooks,
}

impl EngineProps {
    /// Whether two snapshots carry the same configuration.
    ///
    /// Hooks are excluded: the binding layer rebuilds its closures on every
    /// pass, so comparing them would make every snapshot look new.
    pub fn config_eq(&self, other: &EngineProps) -> bool {
        self.content == other.content
            && self.placement == other.placement
            && self.triggers == other.triggers
            && self.delay == other.delay
            && self.duration == other.duration
            && self.interactive == other.interactive
            && self.hide_on_click == other.hide_on_click
            && self.ignore_attributes == other.ignore_attributes
            && self.offset == other.offset
            && self.plugins == other.plugins
            && self.modifiers == other.modifiers
            && self.extra == other.extra
    }
}

/// Merge a declared snapshot against the engine's currently-recorded one.
///
/// Declared options win.  Positioning modifiers recorded on the live handle
/// that the declared snapshot does not name are preserved, as are
/// pass-through options under keys the declared snapshot does not set.
/// Neither input is modified.
pub fn merge_props(current: &EngineProps, declared: &EngineProps) -> EngineProps {
    let mut merged = declared.clone();
    for modifier in &current.modifiers {
        if !merged.modifiers.iter().any(|m| m.name == modifier.name) {
            merged.modifiers.push(modifier.clone());
        }
    }
    for (key, value) in &current.extra {
        if !merged.extra.contains_key(key) {
            merged.extra.insert(key.clone(), value.clone());
        }
    }
    merged
}
