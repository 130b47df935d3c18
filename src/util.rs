//! Shared utilities for the autopost codebase

use serde::Deserialize;
use std::fmt;

/// A string wrapper that masks its contents in Debug/Display output.
/// Prevents accidental logging of API keys and WordPress passwords.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Intentionally access the raw secret value (for headers, URLs, etc.)
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SecretString {
    fn default() -> Self {
        Self(String::new())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<&str> for SecretString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Sanitize a string for use as a single path component (directory or file
/// stem). Replaces characters that are illegal on common filesystems with
/// underscores and caps the length at `max_chars` characters (not bytes, so
/// multi-byte titles are never cut mid-character).
pub fn sanitize_component(s: &str, max_chars: usize) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(max_chars)
        .collect();

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_hides_in_debug() {
        let secret = SecretString::new("my-api-key-123".to_string());
        let debug_output = format!("{:?}", secret);
        assert_eq!(debug_output, "***");
        assert!(!debug_output.contains("my-api-key"));
    }

    #[test]
    fn test_secret_string_hides_in_display() {
        let secret = SecretString::new("my-api-key-123".to_string());
        assert_eq!(format!("{}", secret), "***");
    }

    #[test]
    fn test_secret_string_expose_returns_value() {
        let secret = SecretString::new("my-api-key-123".to_string());
        assert_eq!(secret.expose(), "my-api-key-123");
    }

    #[test]
    fn test_secret_string_deserializes_transparently() {
        let secret: SecretString = serde_yaml_ng::from_str("wp-app-password").unwrap();
        assert_eq!(secret.expose(), "wp-app-password");
    }

    #[test]
    fn test_sanitize_component_replaces_illegal_chars() {
        assert_eq!(sanitize_component("a/b\\c:d", 50), "a_b_c_d");
        assert_eq!(
            sanitize_component("what? \"why\" <now>", 50),
            "what_ _why_ _now_"
        );
        assert_eq!(sanitize_component("pipe|star*", 50), "pipe_star_");
    }

    #[test]
    fn test_sanitize_component_caps_chars_not_bytes() {
        let long = "标题".repeat(40);
        let out = sanitize_component(&long, 50);
        assert_eq!(out.chars().count(), 50);
    }

    #[test]
    fn test_sanitize_component_empty_falls_back() {
        assert_eq!(sanitize_component("   ", 50), "untitled");
        assert_eq!(sanitize_component("", 50), "untitled");
    }
}
