//! A retained, reference-counted element tree.
//!
//! [`Element`] is the common currency between the declarative side (trigger
//! elements, projected content) and the popover engine (popper roots,
//! detached content containers).  Identity is pointer identity: two
//! [`Element`] values refer to the same node if and only if
//! [`ptr_eq`](Element::ptr_eq) returns `true`.  That identity is what the
//! binding layer uses to detect a trigger swap and to decide whether
//! projected content actually changed.
//!
//! Nodes can be *detached* (no parent).  A detached node is how the portal
//! keeps declarative content out of the statically rendered tree while the
//! engine displays it elsewhere.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A node in the retained element tree.
///
/// Cloning an `Element` is cheap and yields another handle to the *same*
/// node.  All mutation goes through interior mutability; the tree is
/// single-threaded by design, matching the synchronous commit model of the
/// binding layer.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<NodeData>>,
}

struct NodeData {
    tag: String,
    classes: Vec<String>,
    text: String,
    children: Vec<Element>,
    parent: Weak<RefCell<NodeData>>,
}

impl Element {
    /// Create a new detached element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(NodeData {
                tag: tag.into(),
                classes: Vec::new(),
                text: String::new(),
                children: Vec::new(),
                parent: Weak::new(),
            })),
        }
    }

    /// The element's tag name.
    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    /// Whether `self` and `other` are handles to the same node.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Set the element's text content.
    pub fn set_text(&self, text: impl Into<String>) {
        self.inner.borrow_mut().text = text.into();
    }

    /// The element's text content.
    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    /// Append `child`, detaching it from any previous parent first.
    ///
    /// Appending an element to itself is ignored.
    pub fn append_child(&self, child: &Element) {
        if self.ptr_eq(child) {
            return;
        }
        child.detach();
        self.inner.borrow_mut().children.push(child.clone());
        child.inner.borrow_mut().parent = Rc::downgrade(&self.inner);
    }

    /// Remove this element from its parent's child list, if it has one.
    pub fn detach(&self) {
        let parent = self.inner.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent.borrow_mut().children.retain(|c| !c.ptr_eq(self));
        }
        self.inner.borrow_mut().parent = Weak::new();
    }

    /// Remove and detach all children.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.inner.borrow_mut().children);
        for child in children {
            child.inner.borrow_mut().parent = Weak::new();
        }
    }

    /// Handles to the element's current children.
    pub fn children(&self) -> Vec<Element> {
        self.inner.borrow().children.clone()
    }

    /// The element's parent, if attached.
    pub fn parent(&self) -> Option<Element> {
        self.inner
            .borrow()
            .parent
            .upgrade()
            .map(|inner| Element { inner })
    }

    /// Whether the element has no parent.
    pub fn is_detached(&self) -> bool {
        self.parent().is_none()
    }

    /// Add a single class token.  Empty tokens and duplicates are ignored.
    pub fn add_class(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let mut data = self.inner.borrow_mut();
        if !data.classes.iter().any(|c| c == name) {
            data.classes.push(name.to_owned());
        }
    }

    /// Remove a single class token, if present.
    pub fn remove_class(&self, name: &str) {
        let name = name.trim();
        self.inner.borrow_mut().classes.retain(|c| c != name);
    }

    /// Add every whitespace-separated token in `names`.
    ///
    /// Whitespace-padded inputs normalize to individual tokens: `" a  b "`
    /// adds `a` and `b`.
    pub fn add_class_names(&self, names: &str) {
        for token in names.split_whitespace() {
            self.add_class(token);
        }
    }

    /// Remove every whitespace-separated token in `names`.
    pub fn remove_class_names(&self, names: &str) {
        for token in names.split_whitespace() {
            self.remove_class(token);
        }
    }

    /// Whether the class list contains `name`.
    pub fn has_class(&self, name: &str) -> bool {
        self.inner.borrow().classes.iter().any(|c| c == name)
    }

    /// The current class tokens, in insertion order.
    pub fn class_list(&self) -> Vec<String> {
        self.inner.borrow().classes.clone()
    }

    /// Serialize the subtree to a markup string.
    ///
    /// Used by tests and demos to assert on rendered output; there is no
    /// escaping, this is not an HTML serializer.
    pub fn to_markup(&self) -> String {
        let data = self.inner.borrow();
        let mut out = String::new();
        out.push('<');
        out.push_str(&data.tag);
        if !data.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&data.classes.join(" "));
            out.push('"');
        }
        if data.text.is_empty() && data.children.is_empty() {
            out.push_str("/>");
            return out;
        }
        out.push('>');
        out.push_str(&data.text);
        for child in &data.children {
            out.push_str(&child.to_markup());
        }
        out.push_str("</");
        out.push_str(&data.tag);
        out.push('>');
        out
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Element")
            .field("tag", &data.tag)
            .field("classes", &data.classes)
            .field("children", &data.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_same_node() {
        let a = Element::new("button");
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        b.set_text("hi");
        assert_eq!(a.text(), "hi");
    }

    #[test]
    fn distinct_nodes_are_not_equal() {
        let a = Element::new("button");
        let b = Element::new("button");
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn append_reparents() {
        let parent = Element::new("div");
        let other = Element::new("div");
        let child = Element::new("span");

        parent.append_child(&child);
        assert_eq!(parent.children().len(), 1);
        assert!(child.parent().unwrap().ptr_eq(&parent));

        other.append_child(&child);
        assert!(parent.children().is_empty());
        assert!(child.parent().unwrap().ptr_eq(&other));
    }

    #[test]
    fn append_self_is_ignored() {
        let el = Element::new("div");
        el.append_child(&el.clone());
        assert!(el.children().is_empty());
    }

    #[test]
    fn clear_children_detaches() {
        let parent = Element::new("div");
        let child = Element::new("span");
        parent.append_child(&child);
        parent.clear_children();
        assert!(parent.children().is_empty());
        assert!(child.is_detached());
    }

    #[test]
    fn class_tokens_normalize_whitespace() {
        let el = Element::new("div");
        el.add_class_names(" a  b ");
        assert_eq!(el.class_list(), vec!["a", "b"]);
        assert!(el.has_class("a"));
        assert!(el.has_class("b"));
    }

    #[test]
    fn class_tokens_deduplicate() {
        let el = Element::new("div");
        el.add_class_names("a a b");
        assert_eq!(el.class_list(), vec!["a", "b"]);
    }

    #[test]
    fn remove_class_names_removes_tokens() {
        let el = Element::new("div");
        el.add_class_names("a b c");
        el.remove_class_names(" a  b ");
        assert_eq!(el.class_list(), vec!["c"]);
    }

    #[test]
    fn markup_round_trip() {
        let root = Element::new("div");
        root.add_class_names("tip dark");
        root.set_text("hello");
        let child = Element::new("span");
        child.set_text("world");
        root.append_child(&child);
        assert_eq!(
            root.to_markup(),
            "<div class=\"tip dark\">hello<span>world</span></div>"
        );
    }

    #[test]
    fn empty_element_self_closes() {
        assert_eq!(Element::new("button").to_markup(), "<button/>");
    }
}
