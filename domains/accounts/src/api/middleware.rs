//! Accounts domain state and access guard integration

use axum::extract::FromRef;
use userline_supabase::IdentityGateway;

use crate::repository::AccountsRepositories;

/// Application state for the Accounts domain
#[derive(Clone)]
pub struct AccountsState {
    pub repos: AccountsRepositories,
    pub identity: IdentityGateway,
}

impl FromRef<AccountsState> for IdentityGateway {
    fn from_ref(state: &AccountsState) -> Self {
        state.identity.clone()
    }
}
