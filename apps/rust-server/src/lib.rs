// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Zitadel Tenant API - Multi-tenant demo API
//!
//! This crate serves a small HTTP API whose protected routes accept ID tokens
//! issued by a Zitadel identity provider.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers, router, and OpenAPI document (Axum)
//! - `auth` - Bearer-token verification against the Zitadel JWKS
//! - `config` - Environment configuration
//! - `models` - Tenant data model and response bodies

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
