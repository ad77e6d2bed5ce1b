// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for auth tests: an RSA signing key, its JWKS, and a
//! static key provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use super::error::VerificationError;
use super::jwks::KeyProvider;
use super::verifier::VerifierSettings;

/// `kid` of the fixture key in `testdata/jwks.json`.
pub const TEST_KID: &str = "test-key-1";
pub const TEST_CLIENT_ID: &str = "client1";
pub const TEST_ISSUER: &str = "https://idp.example";

const SIGNING_KEY_PEM: &str = include_str!("../../testdata/signing_key.pem");
const ROGUE_KEY_PEM: &str = include_str!("../../testdata/rogue_key.pem");
const JWKS_JSON: &str = include_str!("../../testdata/jwks.json");

pub fn fixture_jwks_json() -> &'static str {
    JWKS_JSON
}

pub fn fixture_jwks() -> JwkSet {
    serde_json::from_str(JWKS_JSON).unwrap()
}

/// Fixture key set with every `kid` rewritten.
pub fn fixture_jwks_with_kid(kid: &str) -> JwkSet {
    let mut jwks = fixture_jwks();
    for key in &mut jwks.keys {
        key.common.key_id = Some(kid.to_string());
    }
    jwks
}

pub fn settings() -> VerifierSettings {
    VerifierSettings::new(TEST_CLIENT_ID, TEST_ISSUER)
}

/// Claims that pass validation under [`settings`].
pub fn valid_claims() -> Value {
    json!({
        "sub": "u1",
        "email": "u1@x.com",
        "aud": TEST_CLIENT_ID,
        "iss": TEST_ISSUER,
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 3600,
    })
}

fn header(alg: Algorithm, kid: Option<&str>) -> Header {
    let mut header = Header::new(alg);
    header.kid = kid.map(str::to_string);
    header
}

/// RS256 token signed by the fixture key.
pub fn sign(claims: &Value, kid: &str) -> String {
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY_PEM.as_bytes()).unwrap();
    encode(&header(Algorithm::RS256, Some(kid)), claims, &key).unwrap()
}

/// Token signed by the fixture key under an arbitrary RSA algorithm.
pub fn sign_with_alg(claims: &Value, kid: &str, alg: Algorithm) -> String {
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY_PEM.as_bytes()).unwrap();
    encode(&header(alg, Some(kid)), claims, &key).unwrap()
}

/// RS256 token signed by a key that is not in the fixture key set.
pub fn sign_with_rogue_key(claims: &Value, kid: &str) -> String {
    let key = EncodingKey::from_rsa_pem(ROGUE_KEY_PEM.as_bytes()).unwrap();
    encode(&header(Algorithm::RS256, Some(kid)), claims, &key).unwrap()
}

/// HS256 token keyed with the public modulus, the classic key-confusion forgery.
pub fn sign_hs256_with_public_modulus(claims: &Value, kid: &str) -> String {
    let jwks: Value = serde_json::from_str(JWKS_JSON).unwrap();
    let modulus = jwks["keys"][0]["n"].as_str().unwrap().to_string();
    let key = EncodingKey::from_secret(modulus.as_bytes());
    encode(&header(Algorithm::HS256, Some(kid)), claims, &key).unwrap()
}

/// RS256 token whose header has no `kid`.
pub fn sign_without_kid(claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY_PEM.as_bytes()).unwrap();
    encode(&header(Algorithm::RS256, None), claims, &key).unwrap()
}

/// Serves a fixed key set and counts how often it was asked.
pub struct StaticKeyProvider {
    jwks: Arc<JwkSet>,
    calls: AtomicUsize,
}

impl StaticKeyProvider {
    pub fn new(jwks: JwkSet) -> Self {
        Self {
            jwks: Arc::new(jwks),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyProvider for StaticKeyProvider {
    async fn key_set(&self) -> Result<Arc<JwkSet>, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.jwks))
    }
}

/// Always fails as if the identity provider were down.
pub struct UnavailableKeyProvider;

#[async_trait]
impl KeyProvider for UnavailableKeyProvider {
    async fn key_set(&self) -> Result<Arc<JwkSet>, VerificationError> {
        Err(VerificationError::KeyProviderUnavailable(
            "connection refused".to_string(),
        ))
    }
}

/// Serves `sets` in order, one per fetch, repeating the last one.
pub struct RotatingKeyProvider {
    sets: Vec<Arc<JwkSet>>,
    calls: AtomicUsize,
}

impl RotatingKeyProvider {
    pub fn new(sets: Vec<JwkSet>) -> Self {
        Self {
            sets: sets.into_iter().map(Arc::new).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyProvider for RotatingKeyProvider {
    async fn key_set(&self) -> Result<Arc<JwkSet>, VerificationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.sets.len() - 1);
        Ok(Arc::clone(&self.sets[index]))
    }
}
