//! Accounts domain: shadow profiles mirrored from the identity provider
//!
//! Owns the local `profiles` table, the authentication endpoints that
//! delegate to the identity provider, and the reconciliation logic that
//! lazily creates a shadow profile on first authenticated access.

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{NewProfile, Profile, UpdateProfile};

// Re-export repository types
pub use repository::{AccountsRepositories, ProfileRepository};

// Re-export API types
pub use api::routes;
pub use api::AccountsState;
