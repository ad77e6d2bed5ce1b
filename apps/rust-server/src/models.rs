// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Request/response bodies for the HTTP API and the tenant data model.
//! All types derive `Serialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.
//!
//! ## Tenant Model
//!
//! ```text
//! tenants (id, name)
//!   ├── users    (id, name, tenant_id -> tenants.id)
//!   └── projects (id, name, tenant_id -> tenants.id)
//! ```
//!
//! Ids are random UUIDv4 assigned on construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ClaimSet;

// =============================================================================
// Tenant Model
// =============================================================================

/// A tenant (organisation). Owns users and projects.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
}

impl Tenant {
    pub const TABLE: &'static str = "tenants";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// New user belonging to this tenant.
    pub fn add_user(&self, name: impl Into<String>) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            tenant_id: self.id,
        }
    }

    /// New project belonging to this tenant.
    pub fn add_project(&self, name: impl Into<String>) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.into(),
            tenant_id: self.id,
        }
    }
}

/// A user within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Owning tenant (`tenants.id`).
    pub tenant_id: Uuid,
}

impl User {
    pub const TABLE: &'static str = "users";
}

/// A project within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Owning tenant (`tenants.id`).
    pub tenant_id: Uuid,
}

impl Project {
    pub const TABLE: &'static str = "projects";
}

// =============================================================================
// API Responses
// =============================================================================

/// Generic message body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `GET /protected`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProtectedResponse {
    pub message: String,
    /// `sub` claim
    pub user_id: Option<String>,
    /// `email` claim
    pub email: Option<String>,
    /// Every verified claim, for debugging
    #[schema(value_type = Object)]
    pub full_token_data: Map<String, Value>,
}

impl From<ClaimSet> for ProtectedResponse {
    fn from(claims: ClaimSet) -> Self {
        Self {
            message: "You are authenticated!".to_string(),
            user_id: claims.subject().map(str::to_string),
            email: claims.email().map(str::to_string),
            full_token_data: claims.into_inner(),
        }
    }
}

/// Error body used by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}
