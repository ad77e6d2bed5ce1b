// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Why a structurally valid token failed signature or claim validation.
///
/// Callers only see [`VerificationError::InvalidToken`]; the kind exists for
/// logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenKind {
    /// `exp` is in the past
    Expired,
    /// `nbf` is in the future
    NotYetValid,
    /// Signature does not verify against the selected key
    Signature,
    /// `aud` does not contain the configured client id
    Audience,
    /// `iss` differs from the configured issuer
    Issuer,
    /// Header algorithm is outside the allow-list
    Algorithm,
    /// A required claim (`exp`, `aud`, `iss`) is absent
    MissingClaim,
    /// The selected JWK cannot be used as an RS256 verification key
    Key,
    /// Payload or signature segment could not be decoded
    Malformed,
}

impl InvalidTokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidTokenKind::Expired => "expired",
            InvalidTokenKind::NotYetValid => "not_yet_valid",
            InvalidTokenKind::Signature => "signature",
            InvalidTokenKind::Audience => "audience",
            InvalidTokenKind::Issuer => "issuer",
            InvalidTokenKind::Algorithm => "algorithm",
            InvalidTokenKind::MissingClaim => "missing_claim",
            InvalidTokenKind::Key => "key",
            InvalidTokenKind::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for InvalidTokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&jsonwebtoken::errors::ErrorKind> for InvalidTokenKind {
    fn from(kind: &jsonwebtoken::errors::ErrorKind) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match kind {
            ErrorKind::ExpiredSignature => InvalidTokenKind::Expired,
            ErrorKind::ImmatureSignature => InvalidTokenKind::NotYetValid,
            ErrorKind::InvalidSignature => InvalidTokenKind::Signature,
            ErrorKind::InvalidAudience => InvalidTokenKind::Audience,
            ErrorKind::InvalidIssuer => InvalidTokenKind::Issuer,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                InvalidTokenKind::Algorithm
            }
            ErrorKind::MissingRequiredClaim(_) => InvalidTokenKind::MissingClaim,
            ErrorKind::InvalidKeyFormat | ErrorKind::MissingAlgorithm => InvalidTokenKind::Key,
            _ => InvalidTokenKind::Malformed,
        }
    }
}

/// Verification failure.
///
/// Every variant is terminal for the current request; nothing here is
/// retried by the verifier.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// Token is not a three-segment JWT (usually an opaque access token).
    #[error("Received opaque token. You need to request ID token instead of access token.")]
    OpaqueToken,

    /// Header segment could not be decoded or carries no `kid`.
    #[error("malformed token header: {0}")]
    MalformedHeader(String),

    /// JWKS could not be fetched or parsed.
    #[error("signing keys unavailable: {0}")]
    KeyProviderUnavailable(String),

    /// No key in the current key set carries the header's `kid`.
    #[error("key not found")]
    KeyNotFound { kid: String },

    /// Signature, audience, issuer, or temporal validation failed.
    #[error("{detail}")]
    InvalidToken {
        kind: InvalidTokenKind,
        detail: String,
    },
}

impl VerificationError {
    pub fn invalid(kind: InvalidTokenKind, detail: impl Into<String>) -> Self {
        VerificationError::InvalidToken {
            kind,
            detail: detail.into(),
        }
    }

    /// Short machine-readable name, used as a log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::OpaqueToken => "opaque_token",
            VerificationError::MalformedHeader(_) => "malformed_header",
            VerificationError::KeyProviderUnavailable(_) => "key_provider_unavailable",
            VerificationError::KeyNotFound { .. } => "key_not_found",
            VerificationError::InvalidToken { .. } => "invalid_token",
        }
    }

    /// HTTP status for this error.
    ///
    /// An unreachable identity provider is reported as 503; everything else
    /// is the caller's credential problem and maps to 401.
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerificationError::KeyProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let kind = InvalidTokenKind::from(err.kind());
        VerificationError::invalid(kind, describe(err.kind()))
    }
}

/// Human-readable reason for a `jsonwebtoken` failure.
fn describe(kind: &jsonwebtoken::errors::ErrorKind) -> String {
    use jsonwebtoken::errors::ErrorKind;

    match kind {
        ErrorKind::ExpiredSignature => "Signature has expired.".to_string(),
        ErrorKind::ImmatureSignature => "The token is not yet valid (nbf)".to_string(),
        ErrorKind::InvalidSignature => "Signature verification failed.".to_string(),
        ErrorKind::InvalidAudience => "Invalid audience".to_string(),
        ErrorKind::InvalidIssuer => "Invalid issuer".to_string(),
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            "The specified alg value is not allowed".to_string()
        }
        ErrorKind::MissingRequiredClaim(claim) => format!("Token is missing the \"{claim}\" claim"),
        other => format!("{other:?}"),
    }
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorDetail {
            detail: format!("Invalid token: {self}"),
        });
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
