//! Placeholder substitution for path and body templates

/// Token replaced with the resource identifier before each call
pub const ID_PLACEHOLDER: &str = "{id}";

/// Replace every `{id}` in `template` with `id`.
///
/// No escaping is applied and the substituted value is never re-scanned, so an
/// identifier that itself contains `{id}` is inserted verbatim.
pub fn resolve(template: &str, id: &str) -> String {
    if template.contains(ID_PLACEHOLDER) {
        template.replace(ID_PLACEHOLDER, id)
    } else {
        template.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve("/api/objects/{id}", "5678"), "/api/objects/5678");
    }

    #[test]
    fn test_resolve_without_token_is_noop() {
        assert_eq!(resolve("/api/objects", "5678"), "/api/objects");
        assert_eq!(resolve("", "5678"), "");
    }

    #[test]
    fn test_resolve_all_occurrences() {
        let body = r#"{"id":"{id}","self":"/objects/{id}"}"#;
        assert_eq!(
            resolve(body, "7"),
            r#"{"id":"7","self":"/objects/7"}"#
        );
    }

    #[test]
    fn test_resolve_with_empty_id() {
        // Create flows that derive the id from the response resolve against ""
        assert_eq!(resolve("/api/objects/{id}", ""), "/api/objects/");
    }

    #[test]
    fn test_resolve_is_not_recursive() {
        assert_eq!(resolve("/{id}", "{id}"), "/{id}");
    }
}
