//! Pre-parsed path patterns.

pub const WILDCARD: char = '*';
const SEPARATOR: char = '/';

/// Count wildcard characters in a pattern.
pub fn count_wildcards(pattern: &str) -> usize {
    pattern.chars().filter(|&c| c == WILDCARD).count()
}

/// Strip a single trailing slash, keeping a bare `/` intact.
pub fn normalize_trailing_slash(path: &str) -> &str {
    if path.len() > 1 && path.ends_with(SEPARATOR) {
        &path[..path.len() - 1]
    } else {
        path
    }
}

/// A registered pattern, split once into segments so every match avoids
/// re-parsing. A wildcard segment matches exactly one path segment.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    rule_id: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wildcard,
}

impl PathPattern {
    pub fn new(pattern: &str, rule_id: &str) -> Self {
        let trimmed = pattern.strip_prefix(SEPARATOR).unwrap_or(pattern);
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split(SEPARATOR)
                .map(|part| {
                    if part.len() == 1 && part.starts_with(WILDCARD) {
                        Segment::Wildcard
                    } else {
                        Segment::Literal(part.to_string())
                    }
                })
                .collect()
        };

        Self {
            pattern: pattern.to_string(),
            rule_id: rule_id.to_string(),
            segments,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// Structural match: same segment count, literal segments byte-equal,
    /// wildcard segments accept anything (including an empty segment).
    pub fn matches(&self, request_path: &str) -> bool {
        let trimmed = request_path.strip_prefix(SEPARATOR).unwrap_or(request_path);
        let trimmed = normalize_trailing_slash(trimmed);
        let trimmed = if trimmed == "/" { "" } else { trimmed };

        if trimmed.is_empty() {
            return self.segments.is_empty();
        }

        let mut matched = 0;
        for (idx, part) in trimmed.split(SEPARATOR).enumerate() {
            match self.segments.get(idx) {
                None => return false,
                Some(Segment::Wildcard) => {}
                Some(Segment::Literal(expected)) => {
                    if expected != part {
                        return false;
                    }
                }
            }
            matched = idx + 1;
        }
        matched == self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_matches_itself() {
        let p = PathPattern::new("/api/users", "m1");
        assert!(p.matches("/api/users"));
        assert!(!p.matches("/api/users/42"));
        assert!(!p.matches("/api"));
    }

    #[test]
    fn test_wildcard_matches_single_segment() {
        let p = PathPattern::new("/api/*/profile", "m1");
        assert!(p.matches("/api/v1/profile"));
        assert!(p.matches("/api/anything/profile"));
        assert!(!p.matches("/api/v1/extra/profile"));
        assert!(!p.matches("/api/profile"));
    }

    #[test]
    fn test_wildcard_accepts_empty_segment() {
        let p = PathPattern::new("/api/*/profile", "m1");
        assert!(p.matches("/api//profile"));
    }

    #[test]
    fn test_trailing_slash_tolerated() {
        let p = PathPattern::new("/api/users", "m1");
        assert!(p.matches("/api/users/"));
    }

    #[test]
    fn test_segment_count_must_match() {
        let p = PathPattern::new("/a/*", "m1");
        assert!(p.matches("/a/b"));
        assert!(!p.matches("/a/b/c"));
        assert!(!p.matches("/a"));
    }

    #[test]
    fn test_count_wildcards() {
        assert_eq!(count_wildcards("/api/users"), 0);
        assert_eq!(count_wildcards("/api/*/x/*"), 2);
    }

    #[test]
    fn test_normalize_trailing_slash() {
        assert_eq!(normalize_trailing_slash("/a/b/"), "/a/b");
        assert_eq!(normalize_trailing_slash("/a/b"), "/a/b");
        assert_eq!(normalize_trailing_slash("/"), "/");
    }
}
