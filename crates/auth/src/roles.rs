use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical role identifier.
///
/// The portal understands exactly these three roles; every raw role string
/// coming from the backend is folded into one of them by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalRole {
    Admin,
    Institute,
    #[default]
    Professional,
}

impl CanonicalRole {
    /// All canonical roles, in declaration order.
    pub const ALL: [CanonicalRole; 3] = [Self::Admin, Self::Institute, Self::Professional];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Institute => "institute",
            Self::Professional => "professional",
        }
    }

    /// Human-facing label shown in headers and profile screens.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Institute => "Institution",
            Self::Professional => "Professional",
        }
    }
}

impl core::fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown canonical role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for CanonicalRole {
    type Err = UnknownRole;

    /// Parses a canonical identifier. This is strict: fuzzy input belongs to
    /// [`crate::RoleResolver`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
