// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified claim set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims from a verified ID token.
///
/// Zitadel defines the payload (standard OIDC claims plus
/// `urn:zitadel:iam:*` project/role claims), so the set is kept as an open
/// JSON object rather than a fixed struct. Only ever constructed by the
/// verifier after the signature and `aud`/`iss`/`exp` checks pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// Look up a claim that must be a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Subject (`sub`), the Zitadel user id.
    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// `email`, present when the `email` scope was granted.
    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    /// Expiry (`exp`) as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.0
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ClaimSet {
        serde_json::from_value(json!({
            "sub": "u1",
            "email": "u1@x.com",
            "iss": "https://idp.example",
            "aud": ["client1", "project1"],
            "exp": 1700003600,
            "urn:zitadel:iam:org:project:roles": { "admin": {} }
        }))
        .unwrap()
    }

    #[test]
    fn accessors_read_standard_claims() {
        let claims = sample();
        assert_eq!(claims.subject(), Some("u1"));
        assert_eq!(claims.email(), Some("u1@x.com"));
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1700003600);
    }

    #[test]
    fn non_string_claims_are_not_strings() {
        let claims = sample();
        assert!(claims.get_str("aud").is_none());
        assert!(claims.into_inner()["aud"].is_array());
    }

    #[test]
    fn serializes_as_plain_object() {
        let claims = sample();
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["sub"], "u1");
        assert!(value["urn:zitadel:iam:org:project:roles"]["admin"].is_object());
    }

    #[test]
    fn missing_email_is_none() {
        let mut map = sample().into_inner();
        map.remove("email");
        let claims = ClaimSet(map);
        assert!(claims.email().is_none());
        assert_eq!(claims.subject(), Some("u1"));
    }
}
