//! Database operations for the `profile_designs` table (one row per client).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use xopt_core::{ProfileDesign, ProfileDesignInput, TargetPersona};

use crate::DbError;

/// A row from the `profile_designs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileDesignRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub target_persona: Option<serde_json::Value>,
    pub what_to_deliver: Option<String>,
    pub future_promise: Option<String>,
    pub achievements: Option<String>,
    pub career_history: Option<String>,
    pub profile_text: Option<String>,
    pub header_copy: Option<String>,
    pub fixed_tweet: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileDesignRow {
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] if the stored persona envelope cannot
    /// be decoded.
    pub fn into_design(self) -> Result<ProfileDesign, DbError> {
        let target_persona = self
            .target_persona
            .map(TargetPersona::from_stored)
            .transpose()
            .map_err(|e| DbError::corrupt("profile_designs", e))?;

        Ok(ProfileDesign {
            id: self.id,
            client_id: self.client_id,
            target_persona,
            what_to_deliver: self.what_to_deliver,
            future_promise: self.future_promise,
            achievements: self.achievements,
            career_history: self.career_history,
            profile_text: self.profile_text,
            header_copy: self.header_copy,
            fixed_tweet: self.fixed_tweet,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Returns the client's profile design, or `None` if none has been saved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// if the stored persona is unreadable.
pub async fn get_profile_design(
    pool: &PgPool,
    client_id: Uuid,
) -> Result<Option<ProfileDesign>, DbError> {
    let row = sqlx::query_as::<_, ProfileDesignRow>(
        "SELECT id, client_id, target_persona, what_to_deliver, future_promise, achievements, \
                career_history, profile_text, header_copy, fixed_tweet, created_at, updated_at \
         FROM profile_designs \
         WHERE client_id = $1",
    )
    .bind(client_id)
    .fetch_optional(pool)
    .await?;

    row.map(ProfileDesignRow::into_design).transpose()
}

/// Inserts or replaces the client's profile design.
///
/// An empty persona is stored as `NULL`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including an unknown
/// `client_id`).
pub async fn upsert_profile_design(
    pool: &PgPool,
    client_id: Uuid,
    input: &ProfileDesignInput,
) -> Result<ProfileDesign, DbError> {
    let persona = input
        .target_persona
        .as_ref()
        .filter(|p| !p.is_empty())
        .map(TargetPersona::to_stored);

    let row = sqlx::query_as::<_, ProfileDesignRow>(
        "INSERT INTO profile_designs \
           (id, client_id, target_persona, what_to_deliver, future_promise, achievements, \
            career_history, profile_text, header_copy, fixed_tweet) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (client_id) DO UPDATE SET \
             target_persona  = EXCLUDED.target_persona, \
             what_to_deliver = EXCLUDED.what_to_deliver, \
             future_promise  = EXCLUDED.future_promise, \
             achievements    = EXCLUDED.achievements, \
             career_history  = EXCLUDED.career_history, \
             profile_text    = EXCLUDED.profile_text, \
             header_copy     = EXCLUDED.header_copy, \
             fixed_tweet     = EXCLUDED.fixed_tweet, \
             updated_at      = NOW() \
         RETURNING id, client_id, target_persona, what_to_deliver, future_promise, achievements, \
                   career_history, profile_text, header_copy, fixed_tweet, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(client_id)
    .bind(persona)
    .bind(input.what_to_deliver.as_deref())
    .bind(input.future_promise.as_deref())
    .bind(input.achievements.as_deref())
    .bind(input.career_history.as_deref())
    .bind(input.profile_text.as_deref())
    .bind(input.header_copy.as_deref())
    .bind(input.fixed_tweet.as_deref())
    .fetch_one(pool)
    .await?;

    row.into_design()
}
