// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Protected endpoint.

use axum::Json;

use crate::auth::Auth;
use crate::models::{ErrorResponse, ProtectedResponse};

/// Echo the caller's verified identity.
///
/// Requires `Authorization: Bearer <ID token>` issued by the configured
/// Zitadel instance for this client.
#[utoipa::path(
    get,
    path = "/protected",
    tag = "Auth",
    security(("oauth2" = ["openid", "profile", "email"])),
    responses(
        (status = 200, description = "Token verified", body = ProtectedResponse),
        (status = 401, description = "Missing, opaque, or invalid token", body = ErrorResponse),
        (status = 503, description = "Identity provider keys unavailable", body = ErrorResponse),
    )
)]
pub async fn protected_route(Auth(claims): Auth) -> Json<ProtectedResponse> {
    tracing::info!(sub = claims.subject().unwrap_or_default(), "Protected route accessed");
    Json(claims.into())
}
