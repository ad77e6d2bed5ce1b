// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{HttpKeyProvider, TokenVerifier, VerificationError};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: AppConfig, verifier: TokenVerifier) -> Self {
        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
        }
    }

    /// Build the state for a running server: an HTTP JWKS provider wrapped in
    /// the configured key-set policy.
    pub fn from_config(config: AppConfig) -> Result<Self, VerificationError> {
        let http = HttpKeyProvider::new(&config.jwks_url, config.jwks_fetch_timeout)?;
        let keys = config.jwks_policy.provider(http);
        let verifier = TokenVerifier::new(config.verifier_settings(), keys);
        Ok(Self::new(config, verifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::KeySetPolicy;
    use std::time::Duration;

    #[test]
    fn from_config_wires_verifier_settings() {
        let config = AppConfig::for_tests();
        let state = AppState::from_config(config).unwrap();

        assert_eq!(state.verifier.settings().audience, "client1");
        assert_eq!(state.verifier.settings().issuer, "https://idp.example");
    }

    #[test]
    fn from_config_accepts_cached_policy() {
        let mut config = AppConfig::for_tests();
        config.jwks_policy = KeySetPolicy::Cached {
            ttl: Duration::from_secs(300),
        };
        assert!(AppState::from_config(config).is_ok());
    }
}
