// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{AuthorizationCode, Flow, OAuth2, Scopes, SecurityScheme},
    OpenApi,
};
use utoipa_swagger_ui::{oauth, SwaggerUi};

use crate::{
    config::AppConfig,
    error,
    models::{ErrorResponse, MessageResponse, Project, ProtectedResponse, Tenant, User},
    state::AppState,
};

pub mod health;
pub mod protected;
pub mod token;

/// OIDC scopes requested by the interactive login flow.
const OAUTH_SCOPES: [(&str, &str); 3] = [
    ("openid", "OpenID Connect"),
    ("profile", "User profile information"),
    ("email", "User email address"),
];

pub fn router(state: AppState) -> Router {
    let docs = SwaggerUi::new("/docs")
        .url("/openapi.json", api_doc(&state.config))
        .oauth(swagger_oauth(&state.config));

    Router::new()
        .route("/", get(health::root))
        .route("/token", get(token::get_token))
        .route("/protected", get(protected::protected_route))
        .fallback(error::not_found)
        .with_state(state)
        .merge(docs)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// OpenAPI document with the Zitadel authorization-code flow attached.
pub fn api_doc(config: &AppConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let scopes = Scopes::from_iter(OAUTH_SCOPES);
    let flow = Flow::AuthorizationCode(AuthorizationCode::new(
        config.authorize_url(),
        config.token_url.clone(),
        scopes,
    ));
    doc.components
        .get_or_insert_with(Default::default)
        .add_security_scheme("oauth2", SecurityScheme::OAuth2(OAuth2::new([flow])));
    doc
}

/// Swagger UI login settings: public client with PKCE.
fn swagger_oauth(config: &AppConfig) -> oauth::Config {
    oauth::Config::new()
        .client_id(&config.client_id)
        .use_pkce_with_authorization_code_grant(true)
        .scopes(OAUTH_SCOPES.iter().map(|(name, _)| name.to_string()).collect())
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Zitadel Multi-Tenant Demo"),
    paths(health::root, token::get_token, protected::protected_route),
    components(
        schemas(
            MessageResponse,
            ProtectedResponse,
            ErrorResponse,
            Tenant,
            User,
            Project
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Zitadel bearer-token protected endpoints")
    )
)]
struct ApiDoc;
