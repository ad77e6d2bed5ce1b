// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for verified bearer tokens.
//!
//! Use the `Auth` extractor in handlers to require a valid ID token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims is the verified ClaimSet
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::{ClaimSet, VerificationError};
use crate::state::AppState;

/// Rejection for [`Auth`].
#[derive(Debug)]
pub enum AuthRejection {
    /// No `Authorization: Bearer ...` header
    NotAuthenticated,
    /// A bearer token was presented but did not verify
    Verification(VerificationError),
}

#[derive(Serialize)]
struct NotAuthenticatedBody {
    detail: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::NotAuthenticated => {
                let body = Json(NotAuthenticatedBody {
                    detail: "Not authenticated",
                });
                let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            AuthRejection::Verification(err) => err.into_response(),
        }
    }
}

impl From<VerificationError> for AuthRejection {
    fn from(err: VerificationError) -> Self {
        AuthRejection::Verification(err)
    }
}

/// Extract the credentials from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. A `Bearer` header with no
/// credential yields `Some("")`, which the verifier rejects as an opaque
/// token; any other scheme yields `None`.
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let (scheme, credentials) = header.split_once(' ').unwrap_or((header, ""));
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| credentials.trim())
}

/// Extractor for verified ID-token claims.
///
/// Verification runs through [`AppState::verifier`], so every request pays
/// whatever key-set policy the verifier was built with.
pub struct Auth(pub ClaimSet);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthRejection::NotAuthenticated)?;

        let claims = state.verifier.verify(token).await?;
        Ok(Auth(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{sign, valid_claims, StaticKeyProvider, TEST_KID};
    use crate::auth::test_support::{fixture_jwks, settings};
    use crate::auth::TokenVerifier;
    use crate::config::AppConfig;
    use axum::http::Request;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let verifier = TokenVerifier::new(
            settings(),
            Arc::new(StaticKeyProvider::new(fixture_jwks())),
        );
        AppState::new(AppConfig::for_tests(), verifier)
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER   abc  "), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer"), Some(""));
        assert_eq!(bearer_token("Bearer    "), Some(""));
        assert_eq!(bearer_token(""), None);
        assert_eq!(bearer_token("Bearerabc"), None);
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = test_state();
        let mut parts = parts_with_auth(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthRejection::NotAuthenticated)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_other_schemes() {
        let state = test_state();
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthRejection::NotAuthenticated)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_signed_token() {
        let state = test_state();
        let token = sign(&valid_claims(), TEST_KID);
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let Auth(claims) = Auth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(claims.subject(), Some("u1"));
    }

    #[tokio::test]
    async fn auth_extractor_surfaces_verification_error() {
        let state = test_state();
        let mut parts = parts_with_auth(Some("Bearer opaque-access-token"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(
            result,
            Err(AuthRejection::Verification(VerificationError::OpaqueToken))
        ));
    }

    #[tokio::test]
    async fn empty_bearer_credential_is_verified_as_opaque() {
        let state = test_state();
        let mut parts = parts_with_auth(Some("Bearer "));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(
            result,
            Err(AuthRejection::Verification(VerificationError::OpaqueToken))
        ));
    }

    #[tokio::test]
    async fn not_authenticated_response() {
        let response = AuthRejection::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), br#"{"detail":"Not authenticated"}"#);
    }
}
