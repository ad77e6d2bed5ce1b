// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token verification for the API. Login itself happens at the
//! Zitadel identity provider.
//!
//! ## Auth Flow
//!
//! 1. Client runs the authorization-code + PKCE flow against Zitadel
//!    (Swagger UI at `/docs` is preconfigured for it)
//! 2. Client sends `Authorization: Bearer <ID token>`
//! 3. Server:
//!    - Rejects anything that is not a three-segment JWT (opaque access
//!      tokens are a distinct error)
//!    - Fetches the Zitadel JWKS via HTTPS
//!    - Verifies the RS256 signature, `exp`/`nbf`, issuer, and audience
//!    - Hands the full claim set to the handler
//!
//! ## Security
//!
//! - Algorithm allow-list is exactly RS256
//! - Audience and issuer must match exactly
//! - JWKS fetches are bounded by a timeout
//! - JWKS caching is opt-in ([`KeySetPolicy`])

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::ClaimSet;
pub use error::{InvalidTokenKind, VerificationError};
pub use extractor::{Auth, AuthRejection};
pub use jwks::{CachedKeyProvider, HttpKeyProvider, KeyProvider, KeySetPolicy};
pub use verifier::{TokenVerifier, VerifierSettings};
