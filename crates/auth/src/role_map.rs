//! Role variant table: canonical role → accepted spellings.
//!
//! The table is configuration. It is built once (from code or JSON), validated,
//! and then only read. Iteration order is declaration order and is significant:
//! the resolver scans roles and variants in this order and the first hit wins.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use thiserror::Error;

use crate::roles::{CanonicalRole, UnknownRole};

#[derive(Debug, Error)]
pub enum RoleMapError {
    #[error("role map is empty")]
    Empty,

    #[error("role '{0}' is listed more than once")]
    DuplicateRole(CanonicalRole),

    #[error("role '{0}' has no variants")]
    NoVariants(CanonicalRole),

    #[error("role '{0}' has an empty variant")]
    EmptyVariant(CanonicalRole),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),

    #[error("invalid role map json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read role map: {0}")]
    Io(#[from] std::io::Error),
}

/// One canonical role and its variants (trimmed, lowercased, in order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    role: CanonicalRole,
    variants: Vec<String>,
}

impl RoleEntry {
    pub fn role(&self) -> CanonicalRole {
        self.role
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

/// Immutable, validated role variant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMap {
    entries: Vec<RoleEntry>,
}

impl RoleMap {
    pub fn builder() -> RoleMapBuilder {
        RoleMapBuilder::default()
    }

    /// The table the portal ships with.
    pub fn builtin() -> Self {
        Self::from_static(&[
            (
                CanonicalRole::Admin,
                &[
                    "admin",
                    "super_admin",
                    "manager_admin",
                    "admin_head",
                    "system_admin",
                    "root_admin",
                    "administrator",
                    "admin_supervisor",
                    "chief_admin",
                    "admin_lead",
                ],
            ),
            (
                CanonicalRole::Institute,
                &[
                    "institute",
                    "institute_manager",
                    "institution",
                    "institution_head",
                    "inst_manager",
                    "institute_admin",
                    "institute_director",
                    "school_admin",
                    "college_manager",
                    "academic_head",
                    "branch_manager",
                    "academy_lead",
                ],
            ),
            (
                CanonicalRole::Professional,
                &[
                    "professional",
                    "doctor",
                    "specialist",
                    "medic",
                    "nurse",
                    "therapist",
                    "consultant",
                    "physician",
                    "surgeon",
                    "clinician",
                    "practitioner",
                    "healthcare_worker",
                ],
            ),
        ])
    }

    /// Small reference table, handy for documentation and tests.
    pub fn example() -> Self {
        Self::from_static(&[
            (CanonicalRole::Admin, &["admin", "administrator"]),
            (CanonicalRole::Institute, &["institute", "clinic"]),
            (CanonicalRole::Professional, &["professional", "pro"]),
        ])
    }

    // Static tables are already lowercase, non-empty and duplicate-free.
    fn from_static(table: &[(CanonicalRole, &[&str])]) -> Self {
        Self {
            entries: table
                .iter()
                .map(|(role, variants)| RoleEntry {
                    role: *role,
                    variants: variants.iter().map(|v| v.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Parse a JSON object `{ "<role>": ["variant", ...], ... }`.
    ///
    /// Object key order becomes the scan order.
    pub fn from_json_str(json: &str) -> Result<Self, RoleMapError> {
        let raw: RawEntries = serde_json::from_str(json)?;
        raw.into_map()
    }

    pub fn from_json_reader(reader: impl Read) -> Result<Self, RoleMapError> {
        let raw: RawEntries = serde_json::from_reader(reader)?;
        raw.into_map()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RoleMapError> {
        let file = File::open(path.as_ref())?;
        let map = Self::from_json_reader(BufReader::new(file))?;
        tracing::debug!(
            path = %path.as_ref().display(),
            roles = map.len(),
            "loaded role map"
        );
        Ok(map)
    }

    pub fn entries(&self) -> &[RoleEntry] {
        &self.entries
    }

    pub fn variants(&self, role: CanonicalRole) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.role == role)
            .map(RoleEntry::variants)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates role entries; validation happens in [`RoleMapBuilder::build`].
#[derive(Debug, Default)]
pub struct RoleMapBuilder {
    entries: Vec<(CanonicalRole, Vec<String>)>,
}

impl RoleMapBuilder {
    pub fn role<I, S>(mut self, role: CanonicalRole, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((role, variants.into_iter().map(Into::into).collect()));
        self
    }

    pub fn build(self) -> Result<RoleMap, RoleMapError> {
        if self.entries.is_empty() {
            return Err(RoleMapError::Empty);
        }

        let mut entries: Vec<RoleEntry> = Vec::with_capacity(self.entries.len());
        for (role, variants) in self.entries {
            if entries.iter().any(|entry| entry.role == role) {
                return Err(RoleMapError::DuplicateRole(role));
            }
            if variants.is_empty() {
                return Err(RoleMapError::NoVariants(role));
            }

            let mut normalized: Vec<String> = Vec::with_capacity(variants.len());
            for variant in variants {
                let variant = variant.trim().to_lowercase();
                if variant.is_empty() {
                    return Err(RoleMapError::EmptyVariant(role));
                }
                if !normalized.contains(&variant) {
                    normalized.push(variant);
                }
            }

            entries.push(RoleEntry {
                role,
                variants: normalized,
            });
        }

        Ok(RoleMap { entries })
    }
}

/// JSON object entries in document order (a plain map type would sort or hash them).
struct RawEntries(Vec<(String, Vec<String>)>);

impl RawEntries {
    fn into_map(self) -> Result<RoleMap, RoleMapError> {
        let mut builder = RoleMap::builder();
        for (key, variants) in self.0 {
            builder = builder.role(key.parse()?, variants);
        }
        builder.build()
    }
}

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping role identifiers to lists of variants")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
