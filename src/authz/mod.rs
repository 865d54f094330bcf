//! Authorization module - rule evaluation and enforcement
//!
//! This module implements:
//! - First-match rule evaluation over an ordered rule list
//! - The `Authorizer` seam shared by abilities and guards
//! - Configurable enforcement modes (off/advisory/strict)

mod evaluator;
mod guard;

pub use evaluator::{evaluate, Authorizer};
pub use guard::Guard;

use std::str::FromStr;

use crate::errors::AbilityError;

/// Authorization enforcement mode
///
/// Chosen by the host and passed to [`Guard::new`]. Hosts that keep it in
/// their own configuration can parse it with [`str::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnforcementMode {
    /// No permission checks (development mode)
    Off,
    /// Log denials but allow requests (testing mode)
    Advisory,
    /// Reject denied requests (production mode)
    #[default]
    Strict,
}

impl EnforcementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementMode::Off => "off",
            EnforcementMode::Advisory => "advisory",
            EnforcementMode::Strict => "strict",
        }
    }
}

impl FromStr for EnforcementMode {
    type Err = AbilityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "off" => Ok(EnforcementMode::Off),
            "advisory" => Ok(EnforcementMode::Advisory),
            "strict" => Ok(EnforcementMode::Strict),
            other => Err(AbilityError::invalid_argument(format!(
                "unknown enforcement mode '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!("OFF".parse::<EnforcementMode>().unwrap(), EnforcementMode::Off);
        assert_eq!(" advisory ".parse::<EnforcementMode>().unwrap(), EnforcementMode::Advisory);
        assert_eq!("Strict".parse::<EnforcementMode>().unwrap(), EnforcementMode::Strict);
        assert!("lenient".parse::<EnforcementMode>().is_err());
    }

    #[test]
    fn strict_is_the_default() {
        assert_eq!(EnforcementMode::default(), EnforcementMode::Strict);
        assert_eq!(EnforcementMode::default().as_str(), "strict");
    }
}
