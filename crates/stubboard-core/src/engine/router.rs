//! Bucketed wildcard router.

use super::pattern::{count_wildcards, normalize_trailing_slash, PathPattern};
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace, warn};

/// Routes request paths to opaque rule ids.
///
/// Zero-wildcard patterns live in an exact-match table; wildcard patterns are
/// bucketed by wildcard count. Lookup probes the exact table first (an exact
/// match always beats any wildcard pattern), then scans buckets in ascending
/// wildcard-count order so fewer-wildcard patterns win. Within one bucket,
/// registration order is the documented tie-break policy.
pub struct PathRouter {
    max_wildcards: usize,
    max_path_length: usize,
    exact: RwLock<HashMap<String, String>>,
    wildcards: RwLock<BTreeMap<usize, Vec<PathPattern>>>,
}

impl PathRouter {
    pub fn new(max_wildcards: usize, max_path_length: usize) -> Self {
        Self {
            max_wildcards,
            max_path_length,
            exact: RwLock::new(HashMap::new()),
            wildcards: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a pattern for a rule id. Rejects empty, oversized and
    /// over-wildcarded patterns without touching the tables.
    pub fn register(&self, pattern: &str, rule_id: &str) -> Result<()> {
        if pattern.is_empty() {
            return Err(Error::Validation("pattern cannot be empty".to_string()));
        }
        if pattern.len() > self.max_path_length {
            return Err(Error::Validation(format!(
                "pattern exceeds maximum length of {}: {}",
                self.max_path_length,
                pattern.len()
            )));
        }

        let wildcard_count = count_wildcards(pattern);
        if wildcard_count > self.max_wildcards {
            return Err(Error::Validation(format!(
                "pattern cannot have more than {} wildcards: {pattern}",
                self.max_wildcards
            )));
        }

        if wildcard_count == 0 {
            self.exact
                .write()
                .insert(pattern.to_string(), rule_id.to_string());
            debug!(pattern, rule_id, "registered exact pattern");
            return Ok(());
        }

        let parsed = PathPattern::new(pattern, rule_id);
        self.wildcards
            .write()
            .entry(wildcard_count)
            .or_default()
            .push(parsed);
        debug!(pattern, wildcard_count, rule_id, "registered wildcard pattern");
        Ok(())
    }

    /// Resolve a request path to the highest-priority matching rule id.
    pub fn match_path(&self, request_path: &str) -> Option<String> {
        if request_path.is_empty() {
            return None;
        }
        if request_path.len() > self.max_path_length {
            warn!(
                length = request_path.len(),
                max = self.max_path_length,
                "request path exceeds maximum length"
            );
            return None;
        }

        let path = normalize_trailing_slash(request_path);

        if let Some(rule_id) = self.exact.read().get(path) {
            trace!(path, "exact match");
            return Some(rule_id.clone());
        }

        let buckets = self.wildcards.read();
        for (count, patterns) in buckets.iter() {
            for pattern in patterns {
                if pattern.matches(path) {
                    trace!(path, pattern = pattern.pattern(), wildcards = count, "wildcard match");
                    return Some(pattern.rule_id().to_string());
                }
            }
        }

        trace!(path, "no match");
        None
    }

    /// Remove a pattern from whichever table its wildcard count indicates.
    /// Returns false when the pattern was never registered.
    pub fn unregister(&self, pattern: &str) -> bool {
        if pattern.is_empty() {
            return false;
        }

        let wildcard_count = count_wildcards(pattern);
        if wildcard_count == 0 {
            return self.exact.write().remove(pattern).is_some();
        }

        let mut buckets = self.wildcards.write();
        let Some(patterns) = buckets.get_mut(&wildcard_count) else {
            return false;
        };
        let before = patterns.len();
        patterns.retain(|p| p.pattern() != pattern);
        before != patterns.len()
    }

    pub fn size(&self) -> usize {
        let wildcard_count: usize = self.wildcards.read().values().map(Vec::len).sum();
        self.exact.read().len() + wildcard_count
    }

    pub fn clear(&self) {
        self.exact.write().clear();
        self.wildcards.write().clear();
        debug!("cleared all patterns");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> PathRouter {
        PathRouter::new(3, 512)
    }

    #[test]
    fn test_exact_match() {
        let r = router();
        r.register("/api/test", "m1").unwrap();
        assert_eq!(r.match_path("/api/test").as_deref(), Some("m1"));
        assert_eq!(r.match_path("/api/other"), None);
    }

    #[test]
    fn test_exact_beats_wildcard() {
        let r = router();
        r.register("/api/*/profile", "wild").unwrap();
        r.register("/api/v1/profile", "exact").unwrap();
        assert_eq!(r.match_path("/api/v1/profile").as_deref(), Some("exact"));
        assert_eq!(r.match_path("/api/v2/profile").as_deref(), Some("wild"));
    }

    #[test]
    fn test_exact_still_wins_when_wildcard_registered_later() {
        let r = router();
        r.register("/api/v1/profile", "exact").unwrap();
        r.register("/api/*/profile", "wild").unwrap();
        assert_eq!(r.match_path("/api/v1/profile").as_deref(), Some("exact"));
    }

    #[test]
    fn test_fewer_wildcards_win() {
        let r = router();
        r.register("/api/*/*", "two").unwrap();
        r.register("/api/*/users", "one").unwrap();
        assert_eq!(r.match_path("/api/v1/users").as_deref(), Some("one"));
        assert_eq!(r.match_path("/api/v1/items").as_deref(), Some("two"));
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let r = router();
        r.register("/api/*/users", "first").unwrap();
        r.register("/*/v1/users", "second").unwrap();
        assert_eq!(r.match_path("/api/v1/users").as_deref(), Some("first"));
    }

    #[test]
    fn test_too_many_wildcards_rejected_and_router_unchanged() {
        let r = router();
        let err = r.register("/*/*/*/*", "m1").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(r.size(), 0);
        assert_eq!(r.match_path("/a/b/c/d"), None);
    }

    #[test]
    fn test_oversized_pattern_rejected() {
        let r = PathRouter::new(3, 16);
        assert!(r.register("/this/pattern/is/far/too/long", "m1").is_err());
        assert_eq!(r.size(), 0);
    }

    #[test]
    fn test_oversized_request_path_ignored() {
        let r = PathRouter::new(3, 16);
        r.register("/api/test", "m1").unwrap();
        assert_eq!(r.match_path("/a/very/long/request/path/here"), None);
    }

    #[test]
    fn test_unregister_exact() {
        let r = router();
        r.register("/api/test", "m1").unwrap();
        assert!(r.unregister("/api/test"));
        assert_eq!(r.match_path("/api/test"), None);
    }

    #[test]
    fn test_unregister_wildcard() {
        let r = router();
        r.register("/api/*", "m1").unwrap();
        assert!(r.unregister("/api/*"));
        assert_eq!(r.match_path("/api/x"), None);
        assert_eq!(r.size(), 0);
    }

    #[test]
    fn test_unregister_unknown_returns_false() {
        let r = router();
        assert!(!r.unregister("/never/registered"));
        assert!(!r.unregister("/never/*"));
    }

    #[test]
    fn test_trailing_slash_normalized_on_match() {
        let r = router();
        r.register("/api/test", "m1").unwrap();
        assert_eq!(r.match_path("/api/test/").as_deref(), Some("m1"));
    }

    #[test]
    fn test_size_and_clear() {
        let r = router();
        r.register("/a", "1").unwrap();
        r.register("/b/*", "2").unwrap();
        r.register("/c/*/*", "3").unwrap();
        assert_eq!(r.size(), 3);
        r.clear();
        assert_eq!(r.size(), 0);
        assert_eq!(r.match_path("/a"), None);
    }

    #[test]
    fn test_concurrent_register_and_match() {
        use std::sync::Arc;
        use std::thread;

        let r = Arc::new(PathRouter::new(3, 512));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let r = Arc::clone(&r);
                thread::spawn(move || {
                    for i in 0..50 {
                        let pattern = format!("/t{t}/seg{i}");
                        r.register(&pattern, &format!("m-{t}-{i}")).unwrap();
                        assert_eq!(
                            r.match_path(&pattern).as_deref(),
                            Some(format!("m-{t}-{i}").as_str())
                        );
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(r.size(), 8 * 50);
    }
}
