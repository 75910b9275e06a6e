//! Dot-path lookup over nested mappings.
//!
//! `resolve(root, "menu.file.open")` walks one segment at a time and stops at
//! the first missing node. It never panics, and a missing root (a locale that
//! has not been loaded yet) simply resolves to nothing.

/// A mapping that can be walked one key segment at a time.
pub trait Traverse {
    /// The node type reached by a step. Nodes are themselves traversable.
    type Node: Traverse<Node = Self::Node>;

    fn child(&self, segment: &str) -> Option<&Self::Node>;
}

impl Traverse for serde_json::Value {
    type Node = serde_json::Value;

    fn child(&self, segment: &str) -> Option<&serde_json::Value> {
        match self {
            serde_json::Value::Object(map) => map.get(segment),
            _ => None,
        }
    }
}

/// Split a dot-path into segments after trimming surrounding whitespace.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim().split('.')
}

/// Look up `path` under `root`.
///
/// Returns `None` as soon as any segment is absent.
pub fn resolve<'a, R>(root: Option<&'a R>, path: &str) -> Option<&'a R::Node>
where
    R: Traverse + ?Sized,
{
    let mut parts = segments(path);
    let first = parts.next()?;
    let mut node = root?.child(first)?;
    for segment in parts {
        node = node.child(segment)?;
    }
    Some(node)
}

/// Like [`resolve`], substituting `fallback` when the path is absent.
pub fn resolve_or<'a, R>(root: Option<&'a R>, path: &str, fallback: &'a R::Node) -> &'a R::Node
where
    R: Traverse + ?Sized,
{
    resolve(root, path).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::dictionary::{Dictionary, Entry};
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> Dictionary {
        Dictionary::new().with("hello", "Hello").with(
            "menu",
            Dictionary::new()
                .with("file", Dictionary::new().with("open", "Open"))
                .with("edit", "Edit"),
        )
    }

    #[test]
    fn test_resolve_top_level() {
        let dict = sample();
        assert_eq!(resolve(Some(&dict), "hello"), Some(&Entry::from("Hello")));
    }

    #[test]
    fn test_resolve_deep_path() {
        let dict = sample();
        assert_eq!(resolve(Some(&dict), "menu.file.open"), Some(&Entry::from("Open")));
    }

    #[test]
    fn test_resolve_trims_whitespace() {
        let dict = sample();
        assert_eq!(resolve(Some(&dict), "  menu.edit \n"), Some(&Entry::from("Edit")));
    }

    #[test]
    fn test_resolve_intermediate_node_returns_subtree() {
        let dict = sample();
        let node = resolve(Some(&dict), "menu.file").unwrap();
        assert!(node.as_dictionary().is_some());
    }

    #[test]
    fn test_resolve_missing_segment_short_circuits() {
        let dict = sample();
        assert_eq!(resolve(Some(&dict), "menu.missing.open"), None);
        assert_eq!(resolve(Some(&dict), "nope"), None);
    }

    #[test]
    fn test_resolve_through_leaf_is_none() {
        let dict = sample();
        assert_eq!(resolve(Some(&dict), "hello.world"), None);
    }

    #[test]
    fn test_resolve_missing_root() {
        let root: Option<&Dictionary> = None;
        assert_eq!(resolve(root, "hello"), None);
    }

    #[test]
    fn test_resolve_or_uses_fallback() {
        let dict = sample();
        let fallback = Entry::from("default");
        assert_eq!(resolve_or(Some(&dict), "missing", &fallback), &fallback);
        assert_eq!(resolve_or(None::<&Dictionary>, "hello", &fallback), &fallback);
        assert_eq!(resolve_or(Some(&dict), "hello", &fallback), &Entry::from("Hello"));
    }

    #[test]
    fn test_resolve_empty_path_is_none() {
        let dict = sample();
        assert_eq!(resolve(Some(&dict), ""), None);
        assert_eq!(resolve(Some(&dict), "menu."), None);
    }

    #[test]
    fn test_resolve_json_value() {
        let params = json!({ "user": { "name": "Tom" }, "count": 2 });
        assert_eq!(resolve(Some(&params), "user.name"), Some(&json!("Tom")));
        assert_eq!(resolve(Some(&params), "count"), Some(&json!(2)));
        assert_eq!(resolve(Some(&params), "count.inner"), None);
    }

    proptest! {
        #[test]
        fn prop_present_paths_resolve_to_their_leaf(
            a in "[a-z]{1,8}",
            b in "[a-z]{1,8}",
            value in "[ -~]{0,24}",
        ) {
            let dict = Dictionary::new().with(a.clone(), Dictionary::new().with(b.clone(), value.clone()));
            let path = format!("{a}.{b}");
            prop_assert_eq!(resolve(Some(&dict), &path), Some(&Entry::Text(value)));
        }

        #[test]
        fn prop_absent_paths_resolve_to_fallback(
            present in "[a-z]{1,8}",
            absent in "[A-Z]{1,8}",
        ) {
            let dict = Dictionary::new().with(present, "x");
            let fallback = Entry::from("fb");
            prop_assert_eq!(resolve_or(Some(&dict), &absent, &fallback), &fallback);
        }
    }
}
