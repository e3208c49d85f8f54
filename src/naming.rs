use indexmap::IndexMap;

/// Marks a path segment as a placeholder, e.g. `:id`
pub const PLACEHOLDER_MARKER: char = ':';

/// Names derived for one path placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderName {
    /// Name of the placeholder with the marker stripped
    pub name: String,
    /// Document-wide declaration key: request id followed by the name
    pub key: String,
    /// Reference token substituted into the URL
    pub token: String,
}

/// Derive the declaration key and reference token for a placeholder segment.
///
/// Returns `None` for segments without the placeholder marker. Uniqueness
/// across the document relies on request ids being unique.
pub fn placeholder_name(request_id: &str, segment: &str) -> Option<PlaceholderName> {
    let name = segment.strip_prefix(PLACEHOLDER_MARKER)?;
    let key = format!("{}{}", request_id, name);
    Some(PlaceholderName {
        name: name.to_string(),
        token: reference_token(&key),
        key,
    })
}

pub fn reference_token(key: &str) -> String {
    format!("{{{{{}}}}}", key)
}

/// Variables declared in one output document, in declaration order.
///
/// Owned by a single conversion call and handed back with its result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableRegistry {
    entries: IndexMap<String, String>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key = value`. Returns `false` and keeps the existing value
    /// when the key was already declared.
    pub fn declare(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        match self.entries.entry(key.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_name() {
        let named = placeholder_name("r1", ":id").unwrap();
        assert_eq!(named.name, "id");
        assert_eq!(named.key, "r1id");
        assert_eq!(named.token, "{{r1id}}");

        assert!(placeholder_name("r1", "users").is_none());
    }

    #[test]
    fn test_same_placeholder_in_distinct_requests_gets_distinct_keys() {
        let first = placeholder_name("a", ":id").unwrap();
        let second = placeholder_name("b", ":id").unwrap();
        assert_ne!(first.key, second.key);
    }

    #[test]
    fn test_registry_keeps_first_declaration() {
        let mut registry = VariableRegistry::new();
        assert!(registry.declare("r1id", "1"));
        assert!(!registry.declare("r1id", "2"));
        assert_eq!(registry.get("r1id"), Some("1"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("r1id"));
        assert!(!registry.contains("r2id"));
    }
}
