// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::models::MessageResponse;

/// Token endpoint placeholder.
///
/// Tokens are issued by Zitadel; clients obtain them through the
/// authorization-code flow advertised in the OpenAPI document.
#[utoipa::path(
    get,
    path = "/token",
    tag = "Auth",
    responses(
        (status = 200, description = "Placeholder", body = MessageResponse)
    )
)]
pub async fn get_token() -> Json<MessageResponse> {
    Json(MessageResponse::new("Token endpoint"))
}
