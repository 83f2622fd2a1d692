//! Client configuration from environment variables.

use crate::constants::{Environment, DEFAULT_TIMEOUT_SECS};
use crate::error::RaveError;

/// Configuration for a [`crate::RaveClient`].
///
/// Read once at startup and passed to constructors; nothing in the crate
/// reads the environment per call.
#[derive(Clone)]
pub struct RaveConfig {
    /// Merchant secret key (env: RAVE_SECKEY). Required.
    pub secret_key: String,
    /// Merchant public key, sent as `PBFPubKey` (env: RAVE_PUBKEY).
    pub public_key: String,
    /// Sandbox or live (env: RAVE_LIVE, default: sandbox).
    pub environment: Environment,
    /// Base URL override (env: RAVE_BASE_URL). Defaults to the environment's host.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds (env: RAVE_TIMEOUT_SECS, default: 30).
    pub timeout_secs: u64,
}

impl RaveConfig {
    /// Build a sandbox configuration from explicit keys.
    pub fn new(secret_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            public_key: public_key.into(),
            environment: Environment::Sandbox,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn live(mut self, live: bool) -> Self {
        self.environment = Environment::from_live_flag(live);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, RaveError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RaveError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("RAVE_SECKEY")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RaveError::Configuration("RAVE_SECKEY must be set".to_string()))?;

        let public_key = lookup("RAVE_PUBKEY").unwrap_or_default();

        let live = lookup("RAVE_LIVE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let base_url = lookup("RAVE_BASE_URL").filter(|s| !s.is_empty());

        let timeout_secs = match lookup("RAVE_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().ok().filter(|n| *n > 0).ok_or_else(|| {
                RaveError::Configuration(format!(
                    "RAVE_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            secret_key,
            public_key,
            environment: Environment::from_live_flag(live),
            base_url,
            timeout_secs,
        })
    }

    /// Host that requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }

    /// The public key, or a configuration error when it is unset.
    pub fn require_public_key(&self) -> Result<&str, RaveError> {
        if self.public_key.is_empty() {
            return Err(RaveError::Configuration(
                "RAVE_PUBKEY must be set for this method".to_string(),
            ));
        }
        Ok(&self.public_key)
    }
}

impl std::fmt::Debug for RaveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaveConfig")
            .field("secret_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let err = RaveConfig::from_lookup(lookup(&[("RAVE_PUBKEY", "pk")])).unwrap_err();
        assert!(matches!(err, RaveError::Configuration(_)));
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let err = RaveConfig::from_lookup(lookup(&[("RAVE_SECKEY", "")])).unwrap_err();
        assert!(matches!(err, RaveError::Configuration(_)));
    }

    #[test]
    fn defaults_to_sandbox() {
        let cfg = RaveConfig::from_lookup(lookup(&[("RAVE_SECKEY", "FLWSECK-x-X")])).unwrap();
        assert_eq!(cfg.environment, Environment::Sandbox);
        assert_eq!(cfg.base_url(), crate::constants::SANDBOX_BASE_URL);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn live_flag_and_overrides() {
        let cfg = RaveConfig::from_lookup(lookup(&[
            ("RAVE_SECKEY", "FLWSECK-x-X"),
            ("RAVE_LIVE", "1"),
            ("RAVE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert!(cfg.environment.is_live());
        assert_eq!(cfg.base_url(), crate::constants::LIVE_BASE_URL);
        assert_eq!(cfg.timeout_secs, 5);

        let cfg = cfg.with_base_url("http://127.0.0.1:9999");
        assert_eq!(cfg.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = RaveConfig::from_lookup(lookup(&[
            ("RAVE_SECKEY", "FLWSECK-x-X"),
            ("RAVE_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RAVE_TIMEOUT_SECS"));
    }

    #[test]
    fn public_key_is_required_on_demand() {
        let cfg = RaveConfig::new("FLWSECK-x-X", "");
        assert!(cfg.require_public_key().is_err());
        let cfg = RaveConfig::new("FLWSECK-x-X", "FLWPUBK-y-X");
        assert_eq!(cfg.require_public_key().unwrap(), "FLWPUBK-y-X");
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = RaveConfig::new("FLWSECK-topsecret-X", "FLWPUBK-y-X");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("FLWPUBK-y-X"));
    }
}
