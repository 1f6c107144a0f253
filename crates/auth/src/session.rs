//! Session identity established from the backend login response.
//!
//! This is the portal's post-login boundary: it takes the decoded response
//! envelope, resolves the role and collects what the dashboards need. Storage
//! of the resulting identity is the caller's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolver::RoleResolver;
use crate::roles::CanonicalRole;

/// Backend response envelope (`{ status, data, error }`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct AuthResponse<T> {
    pub status: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginData {
    pub id: u64,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Left untyped: the backend is not consistent about this field.
    #[serde(default)]
    pub role: serde_json::Value,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub institute_category_id: Option<u64>,
    #[serde(default)]
    pub professional_category_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub institute_category: Option<InstituteCategory>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstituteCategory {
    #[serde(default)]
    pub name: Option<String>,
}

/// Role-specific category the dashboards filter by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Category {
    Institute { id: u64, name: String },
    Professional { id: u64 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("login rejected: {0}")]
    Rejected(String),

    #[error("login response carried no user data")]
    MissingData,

    #[error("login response carried no access token")]
    MissingToken,
}

/// Everything the client keeps about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    pub user_id: u64,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub display_name: String,
    pub role: CanonicalRole,
    pub category: Option<Category>,
    pub established_at: DateTime<Utc>,
}

impl SessionIdentity {
    pub fn establish(
        response: AuthResponse<LoginData>,
        resolver: &RoleResolver,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if !response.status {
            return Err(SessionError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "login rejected".to_string()),
            ));
        }
        let data = response.data.ok_or(SessionError::MissingData)?;
        if data.access_token.is_empty() {
            return Err(SessionError::MissingToken);
        }

        let resolution = resolver.explain_value(&data.role);
        match (&resolution.tier, data.role.as_str()) {
            (_, None) | (_, Some("")) => {
                tracing::warn!(
                    user_id = data.id,
                    role = %resolution.role,
                    "login response has no role; using default"
                );
            }
            (tier, Some(raw)) if resolution.is_default() => {
                tracing::warn!(
                    user_id = data.id,
                    raw_role = raw,
                    role = %resolution.role,
                    ?tier,
                    "unrecognized role; using default"
                );
            }
            (tier, Some(raw)) => {
                tracing::debug!(user_id = data.id, raw_role = raw, role = %resolution.role, ?tier, "resolved role");
            }
        }

        let display_name = display_name(&data);
        let category = category(resolution.role, &data);

        Ok(Self {
            user_id: data.id,
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            display_name,
            role: resolution.role,
            category,
            established_at: now,
        })
    }

    /// Parse a raw login response body and establish the session.
    pub fn establish_from_json(
        body: &str,
        resolver: &RoleResolver,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionEstablishError> {
        let response: AuthResponse<LoginData> = serde_json::from_str(body)?;
        Ok(Self::establish(response, resolver, now)?)
    }
}

#[derive(Debug, Error)]
pub enum SessionEstablishError {
    #[error("malformed login response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

// First profile name, then account name, then the email local part.
fn display_name(data: &LoginData) -> String {
    let non_empty = |s: &&str| !s.trim().is_empty();

    data.profiles
        .first()
        .and_then(|p| p.name.as_deref())
        .filter(non_empty)
        .or_else(|| data.name.as_deref().filter(non_empty))
        .or_else(|| {
            data.email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .filter(non_empty)
        })
        .unwrap_or("User")
        .to_string()
}

fn category(role: CanonicalRole, data: &LoginData) -> Option<Category> {
    match role {
        CanonicalRole::Institute => {
            let id = data.institute_category_id?;
            let name = data
                .profiles
                .first()
                .and_then(|p| p.institute_category.as_ref())
                .and_then(|c| c.name.clone())
                .filter(|n| !n.is_empty())?;
            Some(Category::Institute { id, name })
        }
        CanonicalRole::Professional => data
            .professional_category_id
            .map(|id| Category::Professional { id }),
        CanonicalRole::Admin => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    fn establish(body: serde_json::Value) -> Result<SessionIdentity, SessionEstablishError> {
        SessionIdentity::establish_from_json(&body.to_string(), &RoleResolver::builtin(), now())
    }

    #[test]
    fn institute_login_carries_category() {
        let identity = establish(json!({
            "status": true,
            "data": {
                "id": 17,
                "access_token": "acc",
                "refresh_token": "ref",
                "email": "front.desk@northclinic.org",
                "role": "Institute_Manager",
                "institute_category_id": 4,
                "profiles": [{
                    "name": "North Clinic",
                    "institute_category": { "name": "Dental" }
                }]
            }
        }))
        .unwrap();

        assert_eq!(identity.user_id, 17);
        assert_eq!(identity.role, CanonicalRole::Institute);
        assert_eq!(identity.display_name, "North Clinic");
        assert_eq!(
            identity.category,
            Some(Category::Institute {
                id: 4,
                name: "Dental".to_string()
            })
        );
        assert_eq!(identity.established_at, now());
    }

    #[test]
    fn institute_category_needs_both_id_and_name() {
        let identity = establish(json!({
            "status": true,
            "data": {
                "id": 18,
                "access_token": "acc",
                "role": "institute",
                "institute_category_id": 4,
                "profiles": [{ "name": "South Clinic" }]
            }
        }))
        .unwrap();
        assert_eq!(identity.category, None);
    }

    #[test]
    fn professional_login_uses_category_id_and_name_fallbacks() {
        let identity = establish(json!({
            "status": true,
            "data": {
                "id": 3,
                "access_token": "acc",
                "refresh_token": "ref",
                "email": "dr.lee@example.com",
                "role": "Physician",
                "professional_category_id": 9,
                "profiles": []
            }
        }))
        .unwrap();

        assert_eq!(identity.role, CanonicalRole::Professional);
        assert_eq!(identity.display_name, "dr.lee");
        assert_eq!(identity.category, Some(Category::Professional { id: 9 }));
    }

    #[test]
    fn admin_login_has_no_category() {
        let identity = establish(json!({
            "status": true,
            "data": {
                "id": 1,
                "access_token": "acc",
                "name": "Ops",
                "role": "SYSTEM_ADMIN",
                "professional_category_id": 9
            }
        }))
        .unwrap();

        assert_eq!(identity.role, CanonicalRole::Admin);
        assert_eq!(identity.display_name, "Ops");
        assert_eq!(identity.category, None);
    }

    #[test]
    fn missing_or_non_string_role_uses_resolver_default() {
        let resolver = RoleResolver::new(crate::RoleMap::example(), CanonicalRole::Institute);
        for role in [json!(null), json!(7), json!("")] {
            let body = json!({
                "status": true,
                "data": { "id": 5, "access_token": "acc", "role": role }
            });
            let identity =
                SessionIdentity::establish_from_json(&body.to_string(), &resolver, now()).unwrap();
            assert_eq!(identity.role, CanonicalRole::Institute);
            assert_eq!(identity.display_name, "User");
        }
    }

    #[test]
    fn rejected_login_surfaces_backend_error() {
        let err = establish(json!({ "status": false, "error": "Invalid credentials" })).unwrap_err();
        assert!(matches!(
            err,
            SessionEstablishError::Session(SessionError::Rejected(ref msg)) if msg == "Invalid credentials"
        ));

        let err = establish(json!({ "status": false })).unwrap_err();
        assert_eq!(err.to_string(), "login rejected: login rejected");
    }

    #[test]
    fn incomplete_responses_are_errors() {
        let err = establish(json!({ "status": true })).unwrap_err();
        assert!(matches!(err, SessionEstablishError::Session(SessionError::MissingData)));

        let err = establish(json!({ "status": true, "data": { "id": 2, "role": "admin" } })).unwrap_err();
        assert!(matches!(err, SessionEstablishError::Session(SessionError::MissingToken)));

        let err = SessionIdentity::establish_from_json("not json", &RoleResolver::builtin(), now())
            .unwrap_err();
        assert!(matches!(err, SessionEstablishError::Malformed(_)));
    }

    #[test]
    fn tokens_are_not_serialized() {
        let identity = establish(json!({
            "status": true,
            "data": { "id": 8, "access_token": "secret", "refresh_token": "also-secret", "role": "nurse" }
        }))
        .unwrap();

        let value = serde_json::to_value(&identity).unwrap();
        assert!(value.get("access_token").is_none());
        assert!(value.get("refresh_token").is_none());
        assert_eq!(value["role"], "professional");
    }
}
