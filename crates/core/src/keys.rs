//! Scoped key derivation for a `(domain, collection)` pair.
//!
//! All three derived strings are pure functions of their inputs, so a
//! controller can recompute them on every call.

/// Suffix appended to the namespace to form the notification channel name.
pub const CHANNEL_SUFFIX: &str = "-cache-updated";

/// URL path predicate: `domain/collection`, or `collection` when no domain is set.
pub fn url_predicate(domain: &str, collection: &str) -> String {
    if domain.is_empty() { collection.to_string() } else { format!("{domain}/{collection}") }
}

/// Local store namespace: `domain:collection`, or `collection` when no domain is set.
pub fn cache_key(domain: &str, collection: &str) -> String {
    if domain.is_empty() { collection.to_string() } else { format!("{domain}:{collection}") }
}

/// Notification channel: `domain-collection-cache-updated`, or `collection-cache-updated`.
pub fn channel_name(domain: &str, collection: &str) -> String {
    if domain.is_empty() {
        format!("{collection}{CHANNEL_SUFFIX}")
    } else {
        format!("{domain}-{collection}{CHANNEL_SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_domain() {
        assert_eq!(url_predicate("", "users"), "users");
        assert_eq!(cache_key("", "users"), "users");
        assert_eq!(channel_name("", "users"), "users-cache-updated");
    }

    #[test]
    fn test_with_domain() {
        assert_eq!(url_predicate("admin", "users"), "admin/users");
        assert_eq!(cache_key("admin", "users"), "admin:users");
        assert_eq!(channel_name("admin", "users"), "admin-users-cache-updated");
    }

    #[test]
    fn test_stability() {
        assert_eq!(cache_key("admin", "users"), cache_key("admin", "users"));
        assert_eq!(url_predicate("admin", "users"), url_predicate("admin", "users"));
        assert_eq!(channel_name("admin", "users"), channel_name("admin", "users"));
    }

    #[test]
    fn test_distinct_namespaces() {
        assert_ne!(cache_key("admin", "users"), cache_key("", "users"));
        assert_ne!(cache_key("a", "b"), cache_key("b", "a"));
    }
}
