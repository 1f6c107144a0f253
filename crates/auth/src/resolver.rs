//! Role resolution: raw backend role string → [`CanonicalRole`].
//!
//! Matching degrades through three tiers and the first hit wins:
//!
//! 1. **exact**: the cleaned input equals a variant
//! 2. **partial**: the cleaned input contains a variant
//! 3. **fuzzy**: the closest variant within [`FUZZY_THRESHOLD`] edits
//!
//! Anything else resolves to the configured default role. Resolution never
//! fails; callers that need to audit the decision use [`RoleResolver::explain`].

use serde::Serialize;

use crate::levenshtein;
use crate::role_map::RoleMap;
use crate::roles::CanonicalRole;

/// Maximum edit distance (inclusive) accepted by the fuzzy tier.
pub const FUZZY_THRESHOLD: usize = 2;

/// Why the default role was returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// Input was absent, not a string, or the empty string.
    MissingInput,
    /// No tier produced a candidate.
    NoMatch,
}

/// The tier that decided a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum MatchTier {
    Exact { variant: String },
    Partial { variant: String },
    Fuzzy { variant: String, distance: usize },
    Default { reason: DefaultReason },
}

/// Outcome of [`RoleResolver::explain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub role: CanonicalRole,
    #[serde(flatten)]
    pub tier: MatchTier,
}

impl Resolution {
    pub fn is_default(&self) -> bool {
        matches!(self.tier, MatchTier::Default { .. })
    }
}

enum Tier<'a> {
    Exact(&'a str),
    Partial(&'a str),
    Fuzzy(&'a str, usize),
    Default(DefaultReason),
}

/// Resolves free-form role strings against an injected [`RoleMap`].
///
/// Pure: no I/O, no interior state. Share it freely (it is `Send + Sync`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleResolver {
    map: RoleMap,
    default_role: CanonicalRole,
}

impl RoleResolver {
    pub fn new(map: RoleMap, default_role: CanonicalRole) -> Self {
        Self { map, default_role }
    }

    /// Built-in table, defaulting to [`CanonicalRole::Professional`].
    pub fn builtin() -> Self {
        Self::new(RoleMap::builtin(), CanonicalRole::default())
    }

    pub fn map(&self) -> &RoleMap {
        &self.map
    }

    pub fn default_role(&self) -> CanonicalRole {
        self.default_role
    }

    pub fn resolve(&self, raw: Option<&str>) -> CanonicalRole {
        self.decide(raw).0
    }

    /// Resolve an untyped payload field. Non-string values count as absent.
    pub fn resolve_value(&self, raw: &serde_json::Value) -> CanonicalRole {
        self.resolve(raw.as_str())
    }

    pub fn explain(&self, raw: Option<&str>) -> Resolution {
        let (role, tier) = self.decide(raw);
        let tier = match tier {
            Tier::Exact(variant) => MatchTier::Exact {
                variant: variant.to_string(),
            },
            Tier::Partial(variant) => MatchTier::Partial {
                variant: variant.to_string(),
            },
            Tier::Fuzzy(variant, distance) => MatchTier::Fuzzy {
                variant: variant.to_string(),
                distance,
            },
            Tier::Default(reason) => MatchTier::Default { reason },
        };
        Resolution { role, tier }
    }

    pub fn explain_value(&self, raw: &serde_json::Value) -> Resolution {
        self.explain(raw.as_str())
    }

    fn decide(&self, raw: Option<&str>) -> (CanonicalRole, Tier<'_>) {
        // The empty string is rejected before trimming; whitespace-only input
        // still goes through the tiers as "".
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return (self.default_role, Tier::Default(DefaultReason::MissingInput));
        };
        let clean = raw.trim().to_lowercase();

        if let Some((role, variant)) = self.first_variant(|variant| variant == clean) {
            return (role, Tier::Exact(variant));
        }

        if let Some((role, variant)) = self.first_variant(|variant| clean.contains(variant)) {
            return (role, Tier::Partial(variant));
        }

        match self.closest_variant(&clean) {
            Some((role, variant, distance)) => (role, Tier::Fuzzy(variant, distance)),
            None => (self.default_role, Tier::Default(DefaultReason::NoMatch)),
        }
    }

    /// First variant (roles outer, variants inner) satisfying `pred`.
    fn first_variant(&self, pred: impl Fn(&str) -> bool) -> Option<(CanonicalRole, &str)> {
        self.map.entries().iter().find_map(|entry| {
            entry
                .variants()
                .iter()
                .find(|variant| pred(variant))
                .map(|variant| (entry.role(), variant.as_str()))
        })
    }

    /// Smallest distance within the threshold; on ties the earliest variant
    /// scanned is kept.
    fn closest_variant(&self, clean: &str) -> Option<(CanonicalRole, &str, usize)> {
        let mut best: Option<(CanonicalRole, &str, usize)> = None;

        for entry in self.map.entries() {
            for variant in entry.variants() {
                let distance = levenshtein::distance(clean, variant);
                if distance > FUZZY_THRESHOLD {
                    continue;
                }
                if best.is_none_or(|(_, _, min)| distance < min) {
                    best = Some((entry.role(), variant.as_str(), distance));
                }
            }
        }

        best
    }
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::builtin()
    }
}
