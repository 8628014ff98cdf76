//! Diagnostics for mapshift.
//!
//! Provides [`Diagnostic`] and [`Severity`], used to record every fallback,
//! ambiguity, and passthrough taken while migrating a command or NBT value.
//! Diagnostic codes are defined in the [`codes`] module.
//!
//! Diagnostics travel two ways: they are collected in the per-call report
//! returned by the core, and [`Diagnostic::emit`] appends them to the
//! process-wide `tracing` stream (target `mapshift`). Neither path affects
//! control flow.

#![warn(missing_docs)]

/// Diagnostic ID constants auto-generated from the catalogue.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// An input could not be migrated and was returned unchanged.
    Error,
    /// A best-effort result was produced; the output may need review.
    Warn,
    /// Informational note.
    Info,
}

/// A diagnostic produced while migrating one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"MS1001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Machine-readable context for tooling (`"command"`, `"value"`, `"label"`...).
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            context: None,
        }
    }

    /// Create a diagnostic using the catalogue's default severity for `id`
    /// (`Warn` for unknown codes).
    pub fn from_code(id: &'static str, message: impl Into<String>) -> Self {
        Self::new(id, default_severity(id).unwrap_or(Severity::Warn), message)
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(id: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Error, message)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(id: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Warn, message)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(id: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(id, Severity::Info, message)
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Add a single context entry (builder pattern).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }

    /// Append this diagnostic to the process-wide log stream.
    pub fn emit(&self) {
        let context = self
            .context
            .as_ref()
            .map(|c| {
                c.iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        match self.severity {
            Severity::Error => {
                tracing::error!(target: "mapshift", code = %self.id, context = %context, "{}", self.message)
            }
            Severity::Warn => {
                tracing::warn!(target: "mapshift", code = %self.id, context = %context, "{}", self.message)
            }
            Severity::Info => {
                tracing::info!(target: "mapshift", code = %self.id, context = %context, "{}", self.message)
            }
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
///
/// Auto-generated from `spec/diagnostics.jsonc` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the catalogue severity for a diagnostic code, if known.
pub fn default_severity(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_display() {
        assert_eq!(format!("{}", Severity::Error), "error");
        assert_eq!(format!("{}", Severity::Warn), "warn");
        assert_eq!(format!("{}", Severity::Info), "info");
    }

    #[test]
    fn from_code_uses_catalogue_severity() {
        let d = Diagnostic::from_code(codes::INTERNAL_FAILURE, "boom");
        assert_eq!(d.severity, Severity::Error);
        let d = Diagnostic::from_code(codes::SAFE_READ_SPLICED, "spliced");
        assert_eq!(d.severity, Severity::Info);
        let d = Diagnostic::from_code(codes::UNKNOWN_COMMAND, "nope");
        assert_eq!(d.severity, Severity::Warn);
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::warn(codes::UNKNOWN_COMMAND, "unknown command 'foo'");
        assert_eq!(format!("{}", d), "warn[MS1001]: unknown command 'foo'");
    }

    #[test]
    fn diagnostic_explain_known() {
        let d = Diagnostic::warn(codes::AMBIGUOUS_LEGACY_VALUE, "test");
        assert!(d.explain().unwrap().contains("placeholder"));
    }

    #[test]
    fn diagnostic_explain_unknown() {
        let d = Diagnostic::error("UNKNOWN_CODE", "test");
        assert!(d.explain().is_none());
        assert!(default_severity("UNKNOWN_CODE").is_none());
    }

    #[test]
    fn all_codes_have_explanations_and_severities() {
        assert!(!codes::ALL.is_empty());
        for code in codes::ALL {
            assert!(explain(code).is_some(), "{code} has no explain() entry");
            assert!(default_severity(code).is_some(), "{code} has no severity");
        }
    }

    #[test]
    fn with_builds_context_incrementally() {
        let d = Diagnostic::warn(codes::UNMATCHED_BRANCH, "no arm")
            .with("command", "scoreboard")
            .with("token", "frobnicate");
        let ctx = d.context.as_ref().unwrap();
        assert_eq!(ctx.get("command").unwrap(), "scoreboard");
        assert_eq!(ctx.get("token").unwrap(), "frobnicate");
    }

    #[test]
    fn diagnostic_serde_omits_none_context() {
        let d = Diagnostic::info(codes::MISSING_ARGUMENT, "dropped");
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("context"), "None context should be omitted: {json}");
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn diagnostic_context_deterministic_order() {
        let d = Diagnostic::warn(codes::MALFORMED_SNBT, "test").with_context(BTreeMap::from([
            ("z_last".into(), "1".into()),
            ("a_first".into(), "2".into()),
        ]));
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.find("a_first").unwrap() < json.find("z_last").unwrap());
    }

    #[test]
    fn emit_without_subscriber_is_silent() {
        Diagnostic::warn(codes::UNKNOWN_COMMAND, "no subscriber installed").emit();
    }
}
