//! Structured error types shared across the VBM crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PanelError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (analysis ids, row counts, tokens).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the regression grid pipeline.
///
/// `Config`, `InsufficientData` and `Fit` are per-analysis conditions that the
/// batch runner counts and moves past. The remaining families are fatal for a
/// run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PanelError {
    /// Unrecognized outcome, specification, cluster or filter token.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// Too few usable rows after filtering or outcome preparation.
    #[error("insufficient data: {0}")]
    InsufficientData(ErrorInfo),
    /// The regression capability could not produce an estimate.
    #[error("fit error: {0}")]
    Fit(ErrorInfo),
    /// Source dataset could not be loaded or joined.
    #[error("data error: {0}")]
    Data(ErrorInfo),
    /// Filesystem failures while reading inputs or writing artifacts.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl PanelError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PanelError::Config(info)
            | PanelError::InsufficientData(info)
            | PanelError::Fit(info)
            | PanelError::Data(info)
            | PanelError::Io(info)
            | PanelError::Serde(info) => info,
        }
    }

    /// Returns true for conditions that only invalidate a single analysis.
    pub fn is_per_analysis(&self) -> bool {
        matches!(
            self,
            PanelError::Config(_) | PanelError::InsufficientData(_) | PanelError::Fit(_)
        )
    }
}

/// Builds a configuration error for an unrecognized token on the given axis.
pub fn unknown_token(axis: &str, token: &str) -> PanelError {
    PanelError::Config(
        ErrorInfo::new(format!("unknown-{axis}"), format!("unknown {axis}: {token}"))
            .with_context("token", token),
    )
}
