//! Mock rule validation, applied before any cache or router mutation.

use crate::config::LimitsConfig;
use crate::domain::MockRuleDraft;
use crate::engine::count_wildcards;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static VALID_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9/_*-]+$").expect("static pattern compiles"));

const VALID_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Checks a candidate rule against the configured bounds. Any failure is a
/// synchronous rejection; nothing downstream has been touched yet.
pub struct MockRuleValidator {
    limits: LimitsConfig,
}

impl MockRuleValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn validate(&self, draft: &MockRuleDraft) -> Result<()> {
        self.validate_path(&draft.path)?;
        self.validate_method(&draft.method)?;
        self.validate_status_code(draft.status_code)?;
        self.validate_body(draft.body.as_deref())?;
        self.validate_headers(draft.headers.as_deref())?;
        self.validate_delay(draft.delay_ms)?;
        Ok(())
    }

    fn validate_path(&self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Error::Validation("path cannot be empty".to_string()));
        }
        if !path.starts_with('/') {
            return Err(Error::Validation("path must start with /".to_string()));
        }
        if path.len() > self.limits.max_path_length {
            return Err(Error::Validation(format!(
                "path exceeds maximum length of {}",
                self.limits.max_path_length
            )));
        }
        if !VALID_PATH.is_match(path) {
            return Err(Error::Validation(
                "path contains invalid characters, allowed: a-z, A-Z, 0-9, /, _, -, *".to_string(),
            ));
        }
        if count_wildcards(path) > self.limits.max_wildcards {
            return Err(Error::Validation(format!(
                "path cannot have more than {} wildcards",
                self.limits.max_wildcards
            )));
        }
        if path.contains("**") {
            return Err(Error::Validation(
                "adjacent wildcards (**) not allowed".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_method(&self, method: &str) -> Result<()> {
        if method.is_empty() {
            return Err(Error::Validation("HTTP method cannot be empty".to_string()));
        }
        let upper = method.to_uppercase();
        if !VALID_METHODS.contains(&upper.as_str()) {
            return Err(Error::Validation(format!("invalid HTTP method: {method}")));
        }
        Ok(())
    }

    fn validate_status_code(&self, status_code: u16) -> Result<()> {
        if !(100..=599).contains(&status_code) {
            return Err(Error::Validation(format!(
                "invalid HTTP status code: {status_code}"
            )));
        }
        Ok(())
    }

    fn validate_body(&self, body: Option<&str>) -> Result<()> {
        let Some(body) = body else {
            return Ok(());
        };
        if serde_json::from_str::<serde_json::Value>(body).is_err() {
            return Err(Error::Validation(
                "body must be a valid JSON string".to_string(),
            ));
        }
        if body.len() > self.limits.max_body_length {
            return Err(Error::Validation(format!(
                "body too large (max {}KB)",
                self.limits.max_body_length / 1000
            )));
        }
        Ok(())
    }

    fn validate_headers(&self, headers: Option<&str>) -> Result<()> {
        let Some(headers) = headers else {
            return Ok(());
        };
        let map: HashMap<String, String> = serde_json::from_str(headers)
            .map_err(|_| Error::Validation("headers must be a valid JSON string map".to_string()))?;
        if map.len() > self.limits.max_headers {
            return Err(Error::Validation(format!(
                "too many headers (max {} allowed)",
                self.limits.max_headers
            )));
        }
        for (key, value) in &map {
            if key.len() > self.limits.max_header_key_length
                || value.len() > self.limits.max_header_value_length
            {
                return Err(Error::Validation("header key or value too long".to_string()));
            }
        }
        Ok(())
    }

    fn validate_delay(&self, delay_ms: u64) -> Result<()> {
        if delay_ms > self.limits.max_delay_ms {
            return Err(Error::Validation(format!(
                "delay must be in the range 0..={}",
                self.limits.max_delay_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> MockRuleValidator {
        MockRuleValidator::new(LimitsConfig::default())
    }

    fn draft() -> MockRuleDraft {
        MockRuleDraft {
            method: "GET".to_string(),
            path: "/api/test".to_string(),
            headers: None,
            body: Some(r#"{"message":"success"}"#.to_string()),
            status_code: 200,
            delay_ms: 0,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(validator().validate(&draft()).is_ok());
    }

    #[test]
    fn test_path_must_start_with_slash() {
        let mut d = draft();
        d.path = "api/test".to_string();
        assert!(matches!(
            validator().validate(&d),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_path_bad_characters_rejected() {
        let mut d = draft();
        d.path = "/api/te st?x=1".to_string();
        assert!(validator().validate(&d).is_err());
    }

    #[test]
    fn test_too_many_wildcards_rejected() {
        let mut d = draft();
        d.path = "/*/*/*/*".to_string();
        assert!(validator().validate(&d).is_err());
    }

    #[test]
    fn test_adjacent_wildcards_rejected() {
        let mut d = draft();
        d.path = "/api/**".to_string();
        assert!(validator().validate(&d).is_err());
    }

    #[test]
    fn test_wildcards_within_limit_pass() {
        let mut d = draft();
        d.path = "/api/*/x/*".to_string();
        assert!(validator().validate(&d).is_ok());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let mut d = draft();
        d.method = "FETCH".to_string();
        assert!(validator().validate(&d).is_err());
    }

    #[test]
    fn test_method_case_insensitive() {
        let mut d = draft();
        d.method = "post".to_string();
        assert!(validator().validate(&d).is_ok());
    }

    #[test]
    fn test_status_code_bounds() {
        let mut d = draft();
        d.status_code = 99;
        assert!(validator().validate(&d).is_err());
        d.status_code = 600;
        assert!(validator().validate(&d).is_err());
        d.status_code = 599;
        assert!(validator().validate(&d).is_ok());
    }

    #[test]
    fn test_body_must_be_json() {
        let mut d = draft();
        d.body = Some("not json".to_string());
        assert!(validator().validate(&d).is_err());
    }

    #[test]
    fn test_oversized_body_rejected() {
        let mut d = draft();
        let long = format!("\"{}\"", "x".repeat(10_001));
        d.body = Some(long);
        assert!(validator().validate(&d).is_err());
    }

    #[test]
    fn test_headers_must_be_string_map() {
        let mut d = draft();
        d.headers = Some(r#"{"X-One":"1"}"#.to_string());
        assert!(validator().validate(&d).is_ok());
        d.headers = Some(r#"["not","a","map"]"#.to_string());
        assert!(validator().validate(&d).is_err());
    }

    #[test]
    fn test_delay_bounds() {
        let mut d = draft();
        d.delay_ms = 10_000;
        assert!(validator().validate(&d).is_ok());
        d.delay_ms = 10_001;
        assert!(validator().validate(&d).is_err());
    }
}
