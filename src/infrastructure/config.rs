//! Flat policy settings as supplied by a host application.
//!
//! Hosts typically expose the limiter as a handful of plain settings. This
//! module deserializes them with serde and turns them into a validated
//! [`Policy`].

use crate::domain::policy::{Policy, PolicyError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when settings cannot be loaded.
#[derive(Debug)]
pub enum ConfigError {
    /// The settings document could not be parsed
    Parse(serde_json::Error),
    /// The settings parsed but describe an invalid policy
    Policy(PolicyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "invalid rate limit settings: {}", e),
            ConfigError::Policy(e) => write!(f, "invalid rate limit policy: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Policy(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<PolicyError> for ConfigError {
    fn from(e: PolicyError) -> Self {
        ConfigError::Policy(e)
    }
}

/// Rate limit settings. Missing fields take their defaults; `null` limits
/// disable the tier.
///
/// # Example
/// ```
/// use request_throttle::PolicyConfig;
///
/// let config = PolicyConfig::from_json_str(
///     r#"{ "requests_per_minute": 5, "requests_per_hour": null, "global_limit": false }"#,
/// )
/// .unwrap();
/// let policy = config.into_policy().unwrap();
///
/// assert!(!policy.scope_global());
/// assert_eq!(policy.enabled_tiers().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Requests allowed per minute
    pub requests_per_minute: Option<u32>,
    /// Requests allowed per hour
    pub requests_per_hour: Option<u32>,
    /// Requests allowed within the sliding window
    pub sliding_window_limit: Option<u32>,
    /// Sliding window length in minutes
    pub sliding_window_minutes: u32,
    /// Count requests across all models of a user rather than per model
    pub global_limit: bool,
    /// Apply limits to admins too
    pub enabled_for_admins: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: Some(10),
            requests_per_hour: Some(50),
            sliding_window_limit: Some(100),
            sliding_window_minutes: 180,
            global_limit: true,
            enabled_for_admins: true,
        }
    }
}

impl PolicyConfig {
    /// Parse settings from a JSON document.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if the document is not valid settings JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the settings into a policy.
    ///
    /// # Errors
    /// Returns `PolicyError` if a limit is zero or the window is zero minutes.
    pub fn into_policy(self) -> Result<Policy, PolicyError> {
        Policy::builder()
            .per_minute(self.requests_per_minute)
            .per_hour(self.requests_per_hour)
            .sliding_window(self.sliding_window_limit, self.sliding_window_minutes)
            .scope_global(self.global_limit)
            .exempt_admins(!self.enabled_for_admins)
            .build()
    }

    /// Parse and validate settings in one step.
    ///
    /// # Errors
    /// Returns `ConfigError` if the document is malformed or the policy invalid.
    pub fn policy_from_json_str(json: &str) -> Result<Policy, ConfigError> {
        Ok(Self::from_json_str(json)?.into_policy()?)
    }
}

impl TryFrom<PolicyConfig> for Policy {
    type Error = PolicyError;

    fn try_from(config: PolicyConfig) -> Result<Self, Self::Error> {
        config.into_policy()
    }
}
