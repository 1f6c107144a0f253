//! `medstaff-auth` — role resolution and post-login session identity.
//!
//! This crate is intentionally decoupled from HTTP, storage and UI.

pub mod levenshtein;
pub mod resolver;
pub mod role_map;
pub mod roles;
pub mod session;

pub use resolver::{DefaultReason, FUZZY_THRESHOLD, MatchTier, Resolution, RoleResolver};
pub use role_map::{RoleEntry, RoleMap, RoleMapBuilder, RoleMapError};
pub use roles::{CanonicalRole, UnknownRole};
pub use session::{
    AuthResponse, Category, LoginData, SessionError, SessionEstablishError, SessionIdentity,
};
