//! Flat maps as plain strings, for stores that only hold text (environment
//! variables, property files, command-line flags).

use {
    crate::FlatMap,
    indexmap::IndexMap,
    serde_json::Value,
};

/// Renders every leaf as text: `null` is empty, strings are verbatim, arrays and
/// anything else use compact json.
pub fn to_string_map(flat: &FlatMap) -> IndexMap<String, String> {
    flat.iter()
        .map(|(key, value)| (key.clone(), render(value)))
        .collect()
}

/// Every value becomes a string leaf; no type guessing happens.
pub fn from_string_map(strings: IndexMap<String, String>) -> FlatMap {
    strings
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(bool) => bool.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(string) => string.clone(),
        other @ (Value::Array(_) | Value::Object(_)) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn test_render_leaves() {
        let flat = crate::flatten_with_separator(
            &json!({"app": {"name": "bellows", "port": 80, "debug": false, "token": null, "hosts": ["a", "b"]}}),
            "__",
        )
        .unwrap();
        let strings = to_string_map(&flat);
        assert_eq!(strings["app__name"], "bellows");
        assert_eq!(strings["app__port"], "80");
        assert_eq!(strings["app__debug"], "false");
        assert_eq!(strings["app__token"], "");
        assert_eq!(strings["app__hosts"], r#"["a","b"]"#);
    }

    #[test]
    fn test_string_map_expands() {
        let strings = IndexMap::from([
            ("APP__DB__HOST".to_string(), "localhost".to_string()),
            ("APP__DB__PORT".to_string(), "5432".to_string()),
        ]);
        let nested = crate::expand_with_separator(&from_string_map(strings), "__").unwrap();
        assert_eq!(
            Value::Object(nested),
            json!({"APP": {"DB": {"HOST": "localhost", "PORT": "5432"}}})
        );
    }
}
