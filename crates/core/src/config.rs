//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the extraction
//! pipeline. The core never reads environment variables itself, so every call sees the same
//! settings regardless of which thread or test harness runs it.

use crate::{CoreError, CoreResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    verify_spans: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self { verify_spans: true }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(verify_spans: bool) -> Self {
        Self { verify_spans }
    }

    /// Whether extraction checks every reconciled mention against its document text.
    pub fn verify_spans(&self) -> bool {
        self.verify_spans
    }
}

/// Parse the span verification flag from an optional string value.
///
/// If `value` is `None` or empty/whitespace, verification stays enabled.
pub fn verify_spans_from_env_value(value: Option<String>) -> CoreResult<bool> {
    let value = value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(true),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(CoreError::InvalidInput(format!(
            "{} must be a boolean, got '{other}'",
            crate::constants::ENV_VERIFY_SPANS
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_verifying() {
        assert!(CoreConfig::default().verify_spans());
        assert!(verify_spans_from_env_value(None).expect("unset"));
        assert!(verify_spans_from_env_value(Some("  ".into())).expect("blank"));
    }

    #[test]
    fn parses_boolean_spellings() {
        assert!(verify_spans_from_env_value(Some("YES".into())).expect("yes"));
        assert!(!verify_spans_from_env_value(Some("0".into())).expect("zero"));
        assert!(!verify_spans_from_env_value(Some(" false ".into())).expect("false"));
    }

    #[test]
    fn rejects_garbage() {
        let err = verify_spans_from_env_value(Some("sometimes".into())).expect_err("invalid");
        match err {
            CoreError::InvalidInput(msg) => assert!(msg.contains("sometimes")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
