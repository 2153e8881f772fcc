//! Export policy: how strictly manifest completeness is enforced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GuardError;

/// Strictness applied to manifest completeness before sealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// No validation and no warnings.
    Off,
    /// Seal anyway, but report what was missing or auto-attached.
    #[default]
    Warn,
    /// Refuse to seal without a complete, caller-supplied manifest.
    Strict,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Off => "off",
            Policy::Warn => "warn",
            Policy::Strict => "strict",
        }
    }

    /// Whether this policy ever produces warnings.
    pub fn is_silent(self) -> bool {
        self == Policy::Off
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = GuardError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Policy::Off),
            "warn" => Ok(Policy::Warn),
            "strict" => Ok(Policy::Strict),
            _ => Err(GuardError::InvalidPolicy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_warn() {
        assert_eq!(Policy::default(), Policy::Warn);
    }

    #[test]
    fn test_parse() {
        assert_eq!("off".parse::<Policy>().unwrap(), Policy::Off);
        assert_eq!(" STRICT ".parse::<Policy>().unwrap(), Policy::Strict);
        assert_eq!("Warn".parse::<Policy>().unwrap(), Policy::Warn);
        assert!(matches!(
            "lenient".parse::<Policy>(),
            Err(GuardError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_only_off_is_silent() {
        assert!(Policy::Off.is_silent());
        assert!(!Policy::Warn.is_silent());
        assert!(!Policy::Strict.is_silent());
    }

    #[test]
    fn test_display_roundtrip() {
        for p in [Policy::Off, Policy::Warn, Policy::Strict] {
            assert_eq!(p.to_string().parse::<Policy>().unwrap(), p);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Policy::Strict).unwrap(), "\"strict\"");
        let p: Policy = serde_json::from_str("\"off\"").unwrap();
        assert_eq!(p, Policy::Off);
    }
}
