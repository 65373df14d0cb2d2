//! Shadow profile repository
//!
//! Runtime `sqlx::query_as` (not macros) so the workspace builds without a
//! live database. One implicit transaction per single-row operation.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use userline_common::{Error, Result};

use crate::domain::entities::{NewProfile, Profile, UpdateProfile};

const PROFILE_COLUMNS: &str =
    "id, supabase_user_id, email, first_name, last_name, metadata, created_at, updated_at";

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new profile and return the saved row.
    ///
    /// `ON CONFLICT DO NOTHING` keeps the one-profile-per-remote-identity
    /// invariant under concurrent first requests: when the insert loses the
    /// race, the row that won is returned instead.
    pub async fn create(&self, new_profile: NewProfile) -> Result<Profile> {
        let inserted: Option<Profile> = sqlx::query_as(&format!(
            r#"
            INSERT INTO profiles (supabase_user_id, email, first_name, last_name, metadata)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (supabase_user_id) DO NOTHING
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(new_profile.supabase_user_id)
        .bind(&new_profile.email)
        .bind(&new_profile.first_name)
        .bind(&new_profile.last_name)
        .bind(Json(&new_profile.metadata))
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(profile) => Ok(profile),
            None => self
                .find_by_supabase_user_id(new_profile.supabase_user_id)
                .await?
                .ok_or_else(|| {
                    Error::Internal("Profile insert conflicted but no existing row found".to_string())
                }),
        }
    }

    /// Find a profile by its remote identity id. A miss is not an error.
    pub async fn find_by_supabase_user_id(
        &self,
        supabase_user_id: Uuid,
    ) -> Result<Option<Profile>> {
        let profile = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE supabase_user_id = $1"
        ))
        .bind(supabase_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Get a profile by internal id. A miss is a `NotFound` error.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Profile> {
        let profile: Option<Profile> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or_else(|| Error::NotFound(format!("User with ID {} not found", id)))
    }

    /// Find a profile by email. A miss is not an error.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Partial update: load (propagating not-found), merge the fields
    /// present in the request, persist. `supabase_user_id` and `email`
    /// are never touched here.
    pub async fn update(&self, id: Uuid, update: UpdateProfile) -> Result<Profile> {
        let mut profile = self.get_by_id(id).await?;
        profile.apply_update(update);

        let updated = sqlx::query_as(&format!(
            r#"
            UPDATE profiles SET
                first_name = $2,
                last_name = $3,
                metadata = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(profile.id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Every profile, in storage order.
    pub async fn find_all(&self) -> Result<Vec<Profile>> {
        let profiles = sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM profiles"))
            .fetch_all(&self.pool)
            .await?;

        Ok(profiles)
    }

    /// Delete by internal id, propagating not-found when no row matched.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User with ID {} not found", id)));
        }

        Ok(())
    }
}
