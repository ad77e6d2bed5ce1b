// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup into an
//! immutable [`AppConfig`] and shared by reference afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ZITADEL_CLIENT_ID` | Expected token audience, Swagger OAuth client | Required |
//! | `ZITADEL_ISSUER` | Expected token issuer, base of the authorize URL | Required |
//! | `ZITADEL_JWKS_URL` | JWKS endpoint for signature verification | Required |
//! | `ZITADEL_TOKEN_URL` | Token endpoint advertised to Swagger UI | `{issuer}/oauth/v2/token` |
//! | `DATABASE_URL` | Connection string for the persistence layer | Unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWKS_CACHE_TTL_SECS` | JWKS cache TTL, `0` fetches on every request | `0` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | Timeout for one JWKS request | `5` |
//! | `JWT_CLOCK_SKEW_SECS` | Leeway for `exp`/`nbf` | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::jwks::DEFAULT_FETCH_TIMEOUT;
use crate::auth::verifier::DEFAULT_CLOCK_SKEW_LEEWAY;
use crate::auth::{KeySetPolicy, VerifierSettings};

pub const CLIENT_ID_ENV: &str = "ZITADEL_CLIENT_ID";
pub const ISSUER_ENV: &str = "ZITADEL_ISSUER";
pub const JWKS_URL_ENV: &str = "ZITADEL_JWKS_URL";
pub const TOKEN_URL_ENV: &str = "ZITADEL_TOKEN_URL";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const CLOCK_SKEW_ENV: &str = "JWT_CLOCK_SKEW_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration.
///
/// `DATABASE_URL` is redacted in Debug output.
#[derive(Clone)]
pub struct AppConfig {
    /// Zitadel client id; the expected `aud`.
    pub client_id: String,
    /// Zitadel instance URL; the expected `iss`.
    pub issuer: String,
    pub jwks_url: String,
    pub token_url: String,
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub jwks_policy: KeySetPolicy,
    pub jwks_fetch_timeout: Duration,
    pub clock_skew_secs: u64,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("issuer", &self.issuer)
            .field("jwks_url", &self.jwks_url)
            .field("token_url", &self.token_url)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("bind_addr", &self.bind_addr)
            .field("jwks_policy", &self.jwks_policy)
            .field("jwks_fetch_timeout", &self.jwks_fetch_timeout)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let client_id = required(vars, CLIENT_ID_ENV)?;
        let issuer = required(vars, ISSUER_ENV)?;
        validate_url(ISSUER_ENV, &issuer)?;
        let jwks_url = required(vars, JWKS_URL_ENV)?;
        let jwks = validate_url(JWKS_URL_ENV, &jwks_url)?;
        if jwks.scheme() != "https" {
            tracing::warn!(url = %jwks_url, "JWKS URL is not HTTPS");
        }

        let token_url = match optional(vars, TOKEN_URL_ENV) {
            Some(url) => {
                validate_url(TOKEN_URL_ENV, &url)?;
                url
            }
            None => format!("{}/oauth/v2/token", issuer.trim_end_matches('/')),
        };

        let host = optional(vars, HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip: IpAddr = host.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            }
        })?;
        let port = parse_or(vars, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr = SocketAddr::new(ip, port);

        let cache_ttl = parse_or(vars, JWKS_CACHE_TTL_ENV, 0u64)?;
        let fetch_timeout =
            parse_or(vars, JWKS_FETCH_TIMEOUT_ENV, DEFAULT_FETCH_TIMEOUT.as_secs())?;
        if fetch_timeout == 0 {
            return Err(ConfigError::Invalid {
                name: JWKS_FETCH_TIMEOUT_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }
        let clock_skew_secs = parse_or(vars, CLOCK_SKEW_ENV, DEFAULT_CLOCK_SKEW_LEEWAY)?;

        Ok(Self {
            client_id,
            issuer,
            jwks_url,
            token_url,
            database_url: optional(vars, DATABASE_URL_ENV),
            bind_addr,
            jwks_policy: KeySetPolicy::from_ttl_secs(cache_ttl),
            jwks_fetch_timeout: Duration::from_secs(fetch_timeout),
            clock_skew_secs,
        })
    }

    /// Expected token values for the verifier.
    pub fn verifier_settings(&self) -> VerifierSettings {
        VerifierSettings::new(&self.client_id, &self.issuer).with_leeway(self.clock_skew_secs)
    }

    /// Zitadel authorization endpoint for the interactive login flow.
    pub fn authorize_url(&self) -> String {
        format!("{}/oauth/v2/authorize", self.issuer.trim_end_matches('/'))
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::from_vars(&HashMap::from([
            (CLIENT_ID_ENV.to_string(), "client1".to_string()),
            (ISSUER_ENV.to_string(), "https://idp.example".to_string()),
            (
                JWKS_URL_ENV.to_string(),
                "https://idp.example/oauth/v2/keys".to_string(),
            ),
        ]))
        .unwrap()
    }
}

fn optional(vars: &HashMap<String, String>, name: &'static str) -> Option<String> {
    vars.get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(vars: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    optional(vars, name).ok_or(ConfigError::MissingEnvVar(name))
}

fn validate_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_or<T>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match optional(vars, name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
