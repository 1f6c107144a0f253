//! Environment-driven configuration for `resolve-role`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use medstaff_auth::{CanonicalRole, RoleMap, RoleResolver};

pub const ROLE_MAP_ENV: &str = "MEDSTAFF_ROLE_MAP";
pub const DEFAULT_ROLE_ENV: &str = "MEDSTAFF_DEFAULT_ROLE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON role map; the built-in table when unset.
    pub role_map_path: Option<PathBuf>,
    pub default_role: CanonicalRole,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let role_map_path = lookup(ROLE_MAP_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let default_role = match lookup(DEFAULT_ROLE_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse()
                .with_context(|| format!("{DEFAULT_ROLE_ENV} must be a canonical role"))?,
            _ => CanonicalRole::default(),
        };

        Ok(Self {
            role_map_path,
            default_role,
        })
    }

    pub fn build_resolver(&self) -> Result<RoleResolver> {
        let map = match &self.role_map_path {
            Some(path) => RoleMap::load(path)
                .with_context(|| format!("failed to load role map from {}", path.display()))?,
            None => RoleMap::builtin(),
        };
        Ok(RoleResolver::new(map, self.default_role))
    }
}
