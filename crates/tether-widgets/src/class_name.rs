//! Class-token application on the engine's rendered root.
//!
//! Class names declared on a binding component apply to the popper the
//! engine renders, not to anything in the declarative tree.  The previous
//! token list is always removed in full before the next one is added, so a
//! changed declaration never leaks stale tokens across updates.

use tether_core::node::Element;
use tether_core::props::Content;

/// Resolve the class list that should actually be applied.
///
/// Class names only make sense for text content: with a custom element
/// tree the caller already controls the rendered markup directly, so the
/// declaration is a misuse and is dropped with a warning.
pub(crate) fn effective(class_name: Option<&str>, content: &Content) -> Option<String> {
    let names = class_name?;
    if content.is_text() {
        Some(names.to_owned())
    } else {
        tracing::warn!(
            "class_name is ignored with custom element content; \
             set classes on the element you render instead"
        );
        None
    }
}

/// Remove `previous` tokens and add `next` tokens on `popper`.
pub(crate) fn swap(popper: &Element, previous: Option<&str>, next: Option<&str>) {
    if let Some(previous) = previous {
        popper.remove_class_names(previous);
    }
    if let Some(next) = next {
        popper.add_class_names(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_passes_text_content_through() {
        let content = Content::Text("tip".into());
        assert_eq!(effective(Some("a b"), &content), Some("a b".to_owned()));
        assert_eq!(effective(None, &content), None);
    }

    #[test]
    fn effective_drops_class_for_element_content() {
        let content = Content::Element(Element::new("span"));
        assert_eq!(effective(Some("a"), &content), None);
    }

    #[test]
    fn swap_replaces_full_token_list() {
        let popper = Element::new("popper");
        swap(&popper, None, Some(" a  b "));
        assert_eq!(popper.class_list(), vec!["a", "b"]);
        swap(&popper, Some("a b"), Some("c"));
        assert_eq!(popper.class_list(), vec!["c"]);
    }
}
