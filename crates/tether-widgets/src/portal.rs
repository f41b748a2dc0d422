//! Content projection into a detached container.
//!
//! Declarative element content is not rendered where it is declared: the
//! engine displays it inside its own popper tree.  The portal owns one
//! detached container per binding instance, created once and reused for the
//! instance's whole lifetime, and only accepts content once the instance is
//! mounted — before the handle exists nothing is projected, so static
//! rendering of the trigger never includes the popover body.
//!
//! Plain text never goes through the portal; it travels inline in the
//! configuration snapshot instead.

use tether_core::node::Element;
use tether_core::props::Content;

/// Projects element content into a detached container.
pub struct Portal {
    container: Element,
    mounted: bool,
    projected: Option<Element>,
}

impl Portal {
    pub fn new() -> Self {
        Self {
            container: Element::new("div"),
            mounted: false,
            projected: None,
        }
    }

    /// The detached container the engine displays.
    ///
    /// The same node for the portal's whole lifetime.
    pub fn container(&self) -> Element {
        self.container.clone()
    }

    /// Enable or disable projection.  Set once the external handle exists.
    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Project `content` into the container.
    ///
    /// Does nothing before mount.  Text content clears any previous
    /// projection (it is handed to the engine inline).  Re-projecting the
    /// same element node is a no-op, so an unchanged render pass does not
    /// churn the container.
    pub fn project(&mut self, content: &Content) {
        if !self.mounted {
            return;
        }
        match content {
            Content::Text(_) => self.clear_projection(),
            Content::Element(el) => {
                if self.projected.as_ref().is_some_and(|p| p.ptr_eq(el)) {
                    return;
                }
                self.container.set_text("");
                self.container.clear_children();
                self.container.append_child(el);
                self.projected = Some(el.clone());
            }
        }
    }

    /// Empty the container and forget the current projection.
    pub fn clear(&mut self) {
        self.clear_projection();
        self.container.set_text("");
    }

    fn clear_projection(&mut self) {
        self.container.clear_children();
        self.projected = None;
    }
}

impl Default for Portal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_is_detached_and_stable() {
        let portal = Portal::new();
        assert!(portal.container().is_detached());
        assert!(portal.container().ptr_eq(&portal.container()));
    }

    #[test]
    fn nothing_projects_before_mount() {
        let mut portal = Portal::new();
        let content = Content::Element(Element::new("span"));
        portal.project(&content);
        assert!(portal.container().children().is_empty());
    }

    #[test]
    fn element_content_projects_after_mount() {
        let mut portal = Portal::new();
        portal.set_mounted(true);
        let el = Element::new("span");
        el.set_text("body");
        portal.project(&Content::Element(el.clone()));
        let children = portal.container().children();
        assert_eq!(children.len(), 1);
        assert!(children[0].ptr_eq(&el));
    }

    #[test]
    fn reprojecting_same_node_is_a_no_op() {
        let mut portal = Portal::new();
        portal.set_mounted(true);
        let el = Element::new("span");
        portal.project(&Content::Element(el.clone()));
        portal.project(&Content::Element(el.clone()));
        assert_eq!(portal.container().children().len(), 1);
    }

    #[test]
    fn switching_to_text_clears_projection() {
        let mut portal = Portal::new();
        portal.set_mounted(true);
        portal.project(&Content::Element(Element::new("span")));
        portal.project(&Content::Text("plain".into()));
        assert!(portal.container().children().is_empty());
    }

    #[test]
    fn switching_nodes_replaces_projection() {
        let mut portal = Portal::new();
        portal.set_mounted(true);
        let first = Element::new("span");
        let second = Element::new("em");
        portal.project(&Content::Element(first.clone()));
        portal.project(&Content::Element(second.clone()));
        let children = portal.container().children();
        assert_eq!(children.len(), 1);
        assert!(children[0].ptr_eq(&second));
        assert!(first.is_detached());
    }
}
