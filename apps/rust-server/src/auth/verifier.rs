// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token verification against the identity provider's JWKS.
//!
//! ## Pipeline
//!
//! 1. Structural check: exactly three dot-separated segments, otherwise the
//!    caller sent an opaque access token
//! 2. Header decode: read `kid` without verifying anything
//! 3. Key retrieval from the [`KeyProvider`]
//! 4. Key selection: first key whose `kid` matches (provider order wins on
//!    duplicates)
//! 5. Signature and claims: RS256 only, exact `aud` and `iss`, `exp`
//!    required, `nbf` honoured
//!
//! Each call is independent and short-circuits on the first failure.

use std::sync::Arc;

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::claims::ClaimSet;
use super::error::{InvalidTokenKind, VerificationError};
use super::jwks::KeyProvider;

/// Clock skew tolerance. Zero: a token is rejected once `exp` has passed.
pub const DEFAULT_CLOCK_SKEW_LEEWAY: u64 = 0;

/// The only accepted signature algorithm.
const ALLOWED_ALGORITHM: Algorithm = Algorithm::RS256;

/// Expected token values, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierSettings {
    /// Expected `aud` (the Zitadel client id)
    pub audience: String,
    /// Expected `iss` (the Zitadel instance URL)
    pub issuer: String,
    /// Leeway applied to `exp` and `nbf`, in seconds
    pub leeway_secs: u64,
}

impl VerifierSettings {
    pub fn new(audience: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            issuer: issuer.into(),
            leeway_secs: DEFAULT_CLOCK_SKEW_LEEWAY,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(ALLOWED_ALGORITHM);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.validate_nbf = true;
        validation.leeway = self.leeway_secs;
        validation
    }
}

/// Verifies bearer tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    settings: VerifierSettings,
    validation: Validation,
    keys: Arc<dyn KeyProvider>,
}

impl TokenVerifier {
    pub fn new(settings: VerifierSettings, keys: Arc<dyn KeyProvider>) -> Self {
        let validation = settings.validation();
        Self {
            settings,
            validation,
            keys,
        }
    }

    pub fn settings(&self) -> &VerifierSettings {
        &self.settings
    }

    /// Verify `token` and return its claims.
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, VerificationError> {
        match self.verify_inner(token).await {
            Ok(claims) => {
                tracing::debug!(
                    sub = claims.subject().unwrap_or_default(),
                    expires_at = ?claims.expires_at(),
                    "Token verified"
                );
                Ok(claims)
            }
            Err(err) => {
                match &err {
                    VerificationError::OpaqueToken => tracing::warn!(
                        "Opaque token received; client must request an ID token instead of an access token"
                    ),
                    VerificationError::KeyNotFound { kid } => {
                        tracing::warn!(%kid, "Token verification failed: key not found")
                    }
                    VerificationError::InvalidToken { kind, detail } => {
                        tracing::warn!(%kind, %detail, "Token verification failed")
                    }
                    other => tracing::warn!(
                        error_code = other.error_code(),
                        error = %other,
                        "Token verification failed"
                    ),
                }
                Err(err)
            }
        }
    }

    async fn verify_inner(&self, token: &str) -> Result<ClaimSet, VerificationError> {
        if !is_compact_jws(token) {
            return Err(VerificationError::OpaqueToken);
        }

        let header =
            decode_header(token).map_err(|e| VerificationError::MalformedHeader(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| VerificationError::MalformedHeader("missing kid".to_string()))?;
        tracing::debug!(%kid, alg = ?header.alg, "Decoded token header");

        let jwks = self.keys.key_set().await?;
        let jwk = match select_key(&jwks, &kid) {
            Some(jwk) => jwk.clone(),
            None => match self.keys.refresh_after_miss().await {
                Some(refreshed) => {
                    let refreshed: Arc<JwkSet> = refreshed?;
                    select_key(&refreshed, &kid)
                        .cloned()
                        .ok_or(VerificationError::KeyNotFound { kid })?
                }
                None => return Err(VerificationError::KeyNotFound { kid }),
            },
        };

        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| VerificationError::invalid(InvalidTokenKind::Key, e.to_string()))?;

        let data = decode::<ClaimSet>(token, &key, &self.validation)?;
        Ok(data.claims)
    }
}

/// A compact JWS has exactly two `.` delimiters.
fn is_compact_jws(token: &str) -> bool {
    token.bytes().filter(|b| *b == b'.').count() == 2
}

/// First key whose `kid` matches; provider order breaks ties.
fn select_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}
