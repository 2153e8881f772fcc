//! Ambient guard configuration.
//!
//! Built once per process and handed to [`ExportGuard::new`](crate::ExportGuard::new).
//! Every field is optional: `None` means "no ambient signal", and the guard
//! falls back to its compiled-in default. Per-call options always win.

use serde::Deserialize;

use crate::error::{GuardError, Result};
use crate::policy::Policy;

/// Environment variable names for the ambient signals.
pub mod env {
    /// `off`, `warn` or `strict`.
    pub const POLICY: &str = "GLYPHSEAL_EXPORT_POLICY";
    /// Boolean: build a glyphcard on every export.
    pub const GLYPHCARD: &str = "GLYPHSEAL_GLYPHCARD";
    /// Boolean: redact sensitive fields in glyphcards.
    pub const REDACT: &str = "GLYPHSEAL_REDACT";
}

/// Process-wide defaults for the export guard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub policy: Option<Policy>,
    pub make_glyphcard: Option<bool>,
    pub redact: Option<bool>,
}

impl GuardConfig {
    /// Read the ambient signals from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the ambient signals through `lookup`.
    ///
    /// Unset or blank variables leave the field as `None`. Unparseable values
    /// are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let policy = read(env::POLICY).and_then(|raw| match raw.parse::<Policy>() {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(var = env::POLICY, value = %raw, "ignoring ambient policy: {}", e);
                None
            }
        });

        let flag = |name: &str| {
            read(name).and_then(|raw| match parse_flag(&raw) {
                Some(b) => Some(b),
                None => {
                    tracing::warn!(var = name, value = %raw, "ignoring non-boolean ambient flag");
                    None
                }
            })
        };

        let config = Self {
            policy,
            make_glyphcard: flag(env::GLYPHCARD),
            redact: flag(env::REDACT),
        };
        tracing::debug!(?config, "loaded guard config");
        config
    }

    /// Parse from JSON, e.g. `{"policy": "strict", "redact": false}`.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| GuardError::Config(e.to_string()))
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_glyphcard(mut self, enabled: bool) -> Self {
        self.make_glyphcard = Some(enabled);
        self
    }

    pub fn with_redaction(mut self, enabled: bool) -> Self {
        self.redact = Some(enabled);
        self
    }
}

/// Parse a boolean flag spelling.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
