//! `{{ placeholder }}` interpolation.

use crate::i18n::path::{resolve, Traverse};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Default placeholder pattern; group 1 is the (untrimmed) parameter path.
pub fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").unwrap())
}

/// Runtime parameters for a single translation call.
///
/// Values are usually strings; any JSON value is accepted so that
/// `{{ user.name }}` can reach into nested parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build params from a JSON object. Any other value yields an empty set.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

impl From<HashMap<String, String>> for Params {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Traverse for Params {
    type Node = Value;

    fn child(&self, segment: &str) -> Option<&Value> {
        self.0.get(segment)
    }
}

/// Render `template` with the default `{{ name }}` pattern.
pub fn render(template: &str, params: &Params) -> String {
    render_with(template, params, placeholder_regex())
}

/// Render `template` using a caller-supplied pattern whose first capture
/// group is the parameter path.
///
/// Unresolved placeholders become empty text. Substituted values are not
/// rendered again.
pub fn render_with(template: &str, params: &Params, pattern: &Regex) -> String {
    pattern
        .replace_all(template, |caps: &Captures| {
            caps.get(1)
                .and_then(|path| resolve(Some(params), path.as_str()))
                .map(value_to_text)
                .unwrap_or_default()
        })
        .into_owned()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        compound => compound.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_simple_placeholder() {
        let params = Params::new().with("name", "Tom");
        assert_eq!(render("Hello {{ name }}", &params), "Hello Tom");
    }

    #[test]
    fn test_render_missing_placeholder_collapses() {
        assert_eq!(render("Hi {{ missing }}", &Params::new()), "Hi ");
    }

    #[test]
    fn test_render_whitespace_tolerant() {
        let params = Params::new().with("name", "Ana");
        assert_eq!(render("{{name}}|{{  name  }}|{{\tname }}", &params), "Ana|Ana|Ana");
    }

    #[test]
    fn test_render_multiple_placeholders() {
        let params = Params::new().with("sent", "3").with("total", "5");
        assert_eq!(render("{{ sent }} of {{ total }} sent", &params), "3 of 5 sent");
    }

    #[test]
    fn test_render_nested_param_path() {
        let params = Params::from_json(json!({ "user": { "name": "Lisa" } }));
        assert_eq!(render("Welcome {{ user.name }}", &params), "Welcome Lisa");
        assert_eq!(render("Welcome {{ user.age }}", &params), "Welcome ");
    }

    #[test]
    fn test_render_scalar_params() {
        let params = Params::new().with("count", 3).with("ok", true).with("nothing", Value::Null);
        assert_eq!(render("{{ count }} {{ ok }} [{{ nothing }}]", &params), "3 true []");
    }

    #[test]
    fn test_render_does_not_recurse() {
        let params = Params::new().with("a", "{{ b }}").with("b", "B");
        assert_eq!(render("x{{ a }}x", &params), "x{{ b }}x");
    }

    #[test]
    fn test_render_without_placeholders_is_unchanged() {
        assert_eq!(render("plain text", &Params::new()), "plain text");
    }

    #[test]
    fn test_render_with_custom_pattern() {
        let pattern = Regex::new(r"%\{([^}]*)\}").unwrap();
        let params = Params::new().with("name", "Tom");
        assert_eq!(render_with("Hi %{name} {{ name }}", &params, &pattern), "Hi Tom {{ name }}");
    }

    #[test]
    fn test_params_from_hash_map() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), "Tom".to_string());
        let params = Params::from(map);
        assert_eq!(params.get("name"), Some(&json!("Tom")));
    }

    #[test]
    fn test_params_from_json_non_object_is_empty() {
        assert!(Params::from_json(json!([1, 2])).is_empty());
    }
}
