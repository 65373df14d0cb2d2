//! Repository implementations for the Accounts domain

pub mod profiles;

use sqlx::PgPool;

pub use profiles::ProfileRepository;

/// Combined repository access for the Accounts domain
#[derive(Clone)]
pub struct AccountsRepositories {
    pub profiles: ProfileRepository,
}

impl AccountsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
        }
    }
}
