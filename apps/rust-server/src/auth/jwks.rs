// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and optional caching.
//!
//! ## Policies
//!
//! - [`KeySetPolicy::AlwaysFetch`] - every verification downloads the key set
//! - [`KeySetPolicy::Cached`] - the key set is cached with a TTL and refreshed
//!   early when a token names a `kid` the cache does not know
//!
//! Every fetch is bounded by the HTTP client timeout; a timeout is reported
//! as [`VerificationError::KeyProviderUnavailable`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::{Mutex, RwLock};

use super::error::VerificationError;

/// Default timeout for a single JWKS request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Minimum age of a cached key set before a `kid` miss may force a refresh.
const MISS_REFRESH_COOLDOWN: Duration = Duration::from_secs(10);

/// Source of the identity provider's signing keys.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Current key set.
    async fn key_set(&self) -> Result<Arc<JwkSet>, VerificationError>;

    /// Called after a `kid` miss. Providers that may be serving a stale set
    /// return a freshly fetched one; providers that always fetch return
    /// `None` since retrying would see the same set.
    async fn refresh_after_miss(&self) -> Option<Result<Arc<JwkSet>, VerificationError>> {
        None
    }
}

/// How the verifier obtains key sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySetPolicy {
    /// Fetch on every verification.
    AlwaysFetch,
    /// Cache for `ttl`, refresh on unknown `kid`.
    Cached { ttl: Duration },
}

impl KeySetPolicy {
    /// Policy for a TTL given in seconds; zero means no caching.
    pub fn from_ttl_secs(secs: u64) -> Self {
        if secs == 0 {
            KeySetPolicy::AlwaysFetch
        } else {
            KeySetPolicy::Cached {
                ttl: Duration::from_secs(secs),
            }
        }
    }

    /// Build the provider stack for this policy on top of an HTTP fetcher.
    pub fn provider(self, http: HttpKeyProvider) -> Arc<dyn KeyProvider> {
        match self {
            KeySetPolicy::AlwaysFetch => Arc::new(http),
            KeySetPolicy::Cached { ttl } => Arc::new(CachedKeyProvider::new(http, ttl)),
        }
    }
}

/// Fetches the key set over HTTP on every call.
#[derive(Clone)]
pub struct HttpKeyProvider {
    jwks_url: String,
    client: reqwest::Client,
}

impl HttpKeyProvider {
    /// Create a provider for `jwks_url` with a per-request timeout.
    pub fn new(jwks_url: impl Into<String>, timeout: Duration) -> Result<Self, VerificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerificationError::KeyProviderUnavailable(e.to_string()))?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            client,
        })
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    async fn fetch(&self) -> Result<JwkSet, VerificationError> {
        tracing::debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "JWKS request timed out".to_string()
                } else {
                    e.to_string()
                };
                VerificationError::KeyProviderUnavailable(reason)
            })?;

        if !response.status().is_success() {
            return Err(VerificationError::KeyProviderUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| VerificationError::KeyProviderUnavailable(e.to_string()))?;

        tracing::debug!(keys = jwks.keys.len(), "Fetched JWKS");
        Ok(jwks)
    }
}

#[async_trait]
impl KeyProvider for HttpKeyProvider {
    async fn key_set(&self) -> Result<Arc<JwkSet>, VerificationError> {
        self.fetch().await.map(Arc::new)
    }
}

/// JWKS cache entry.
struct CacheEntry {
    jwks: Arc<JwkSet>,
    fetched_at: Instant,
}

/// TTL cache in front of another provider.
///
/// Readers clone an immutable snapshot out of a briefly held read lock. The
/// upstream fetch runs under a separate refresh mutex, never under the
/// snapshot lock, so a slow refresh only delays callers that need a new set.
/// Freshness is re-checked after acquiring the mutex, so racing refreshes
/// collapse into one fetch.
pub struct CachedKeyProvider<P> {
    inner: P,
    ttl: Duration,
    miss_cooldown: Duration,
    cache: RwLock<Option<CacheEntry>>,
    refresh: Mutex<()>,
}

impl<P: KeyProvider> CachedKeyProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            miss_cooldown: MISS_REFRESH_COOLDOWN,
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Minimum age of the cached set before a `kid` miss may refetch.
    pub fn with_miss_cooldown(mut self, cooldown: Duration) -> Self {
        self.miss_cooldown = cooldown;
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Check if a key set is cached and within its TTL.
    pub async fn is_cached(&self) -> bool {
        self.snapshot_younger_than(self.ttl).await.is_some()
    }

    async fn snapshot_younger_than(&self, max_age: Duration) -> Option<Arc<JwkSet>> {
        let cache = self.cache.read().await;
        (*cache)
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < max_age)
            .map(|entry| Arc::clone(&entry.jwks))
    }

    /// Replace the snapshot unless another task refreshed it within `max_age`.
    async fn refresh_if_older_than(
        &self,
        max_age: Duration,
    ) -> Result<Arc<JwkSet>, VerificationError> {
        let _guard = self.refresh.lock().await;
        if let Some(jwks) = self.snapshot_younger_than(max_age).await {
            return Ok(jwks);
        }

        let jwks = self.inner.key_set().await?;
        *self.cache.write().await = Some(CacheEntry {
            jwks: Arc::clone(&jwks),
            fetched_at: Instant::now(),
        });
        tracing::info!(keys = jwks.keys.len(), "JWKS cache refreshed");
        Ok(jwks)
    }
}

#[async_trait]
impl<P: KeyProvider> KeyProvider for CachedKeyProvider<P> {
    async fn key_set(&self) -> Result<Arc<JwkSet>, VerificationError> {
        if let Some(jwks) = self.snapshot_younger_than(self.ttl).await {
            return Ok(jwks);
        }
        self.refresh_if_older_than(self.ttl).await
    }

    async fn refresh_after_miss(&self) -> Option<Result<Arc<JwkSet>, VerificationError>> {
        let cooldown = self.miss_cooldown.min(self.ttl);
        if self.snapshot_younger_than(cooldown).await.is_some() {
            return None;
        }

        tracing::debug!("Unknown kid, refreshing JWKS cache");
        Some(self.refresh_if_older_than(cooldown).await)
    }
}
