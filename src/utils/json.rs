use serde_json::{Map, Value};

/// Look up `a.b.c` in a JSON object.
///
/// Returns `None` when any segment is missing or a non-object is reached
/// before the last segment. An empty key returns `None`.
pub fn get_dotted<'a>(config: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }

    let mut segments = key.split('.');
    let first = segments.next()?;
    let mut current = config.get(first)?;

    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Map<String, Value> {
        match json!({
            "settings": {"theme": "dark", "editor": {"tabSize": 4}},
            "numStartups": 12
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_dotted_lookup() {
        let config = sample();
        assert_eq!(get_dotted(&config, "numStartups"), Some(&json!(12)));
        assert_eq!(get_dotted(&config, "settings.theme"), Some(&json!("dark")));
        assert_eq!(get_dotted(&config, "settings.editor.tabSize"), Some(&json!(4)));
        assert_eq!(
            get_dotted(&config, "settings.editor"),
            Some(&json!({"tabSize": 4}))
        );
    }

    #[test]
    fn test_dotted_lookup_missing_segments() {
        let config = sample();
        assert_eq!(get_dotted(&config, "settings.missing"), None);
        assert_eq!(get_dotted(&config, "missing.theme"), None);
        // Stepping into a scalar
        assert_eq!(get_dotted(&config, "numStartups.value"), None);
        assert_eq!(get_dotted(&config, ""), None);
    }
}
