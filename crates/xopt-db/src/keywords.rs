//! Database operations for the `keyword_suggestions` table.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use xopt_core::{KeywordCategory, KeywordStatus, KeywordSuggestion};

use crate::DbError;

/// A row from the `keyword_suggestions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub theme: String,
    pub description: Option<String>,
    pub category: String,
    pub hooks: Vec<String>,
    pub status: String,
    pub used_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KeywordRow {
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] for an unknown category or status.
    pub fn into_keyword(self) -> Result<KeywordSuggestion, DbError> {
        let category = self
            .category
            .parse::<KeywordCategory>()
            .map_err(|e| DbError::corrupt("keyword_suggestions", e))?;
        let status = self
            .status
            .parse::<KeywordStatus>()
            .map_err(|e| DbError::corrupt("keyword_suggestions", e))?;

        Ok(KeywordSuggestion {
            id: self.id,
            client_id: self.client_id,
            theme: self.theme,
            description: self.description,
            category,
            hooks: self.hooks,
            status,
            used_count: self.used_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewKeyword<'a> {
    pub theme: &'a str,
    pub description: Option<&'a str>,
    pub category: KeywordCategory,
    pub hooks: &'a [String],
}

/// Returns the client's saved keywords, newest first, optionally narrowed to
/// one status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn list_keywords(
    pool: &PgPool,
    client_id: Uuid,
    status: Option<KeywordStatus>,
) -> Result<Vec<KeywordSuggestion>, DbError> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        "SELECT id, client_id, theme, description, category, hooks, status, used_count, \
                created_at, updated_at \
         FROM keyword_suggestions \
         WHERE client_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
         ORDER BY created_at DESC",
    )
    .bind(client_id)
    .bind(status.map(KeywordStatus::as_str))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(KeywordRow::into_keyword).collect()
}

/// Returns every saved keyword theme for the client, regardless of status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_keyword_themes(pool: &PgPool, client_id: Uuid) -> Result<Vec<String>, DbError> {
    let themes = sqlx::query_scalar::<_, String>(
        "SELECT theme FROM keyword_suggestions \
         WHERE client_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(themes)
}

/// Returns a single keyword by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn get_keyword(pool: &PgPool, id: Uuid) -> Result<Option<KeywordSuggestion>, DbError> {
    let row = sqlx::query_as::<_, KeywordRow>(
        "SELECT id, client_id, theme, description, category, hooks, status, used_count, \
                created_at, updated_at \
         FROM keyword_suggestions \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(KeywordRow::into_keyword).transpose()
}

/// Saves a batch of keywords as `unused`. Either all are saved or none.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn create_keywords(
    pool: &PgPool,
    client_id: Uuid,
    keywords: &[NewKeyword<'_>],
) -> Result<Vec<KeywordSuggestion>, DbError> {
    let mut tx = pool.begin().await?;
    let mut saved = Vec::with_capacity(keywords.len());

    for keyword in keywords {
        let row = sqlx::query_as::<_, KeywordRow>(
            "INSERT INTO keyword_suggestions \
               (id, client_id, theme, description, category, hooks, status, used_count) \
             VALUES ($1, $2, $3, $4, $5, $6, 'unused', 0) \
             RETURNING id, client_id, theme, description, category, hooks, status, used_count, \
                       created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(client_id)
        .bind(keyword.theme)
        .bind(keyword.description)
        .bind(keyword.category.as_str())
        .bind(keyword.hooks)
        .fetch_one(&mut *tx)
        .await?;

        saved.push(row.into_keyword()?);
    }

    tx.commit().await?;
    Ok(saved)
}

/// Marks a keyword as used and bumps its `used_count`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no keyword has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn mark_keyword_used(pool: &PgPool, id: Uuid) -> Result<KeywordSuggestion, DbError> {
    let row = sqlx::query_as::<_, KeywordRow>(
        "UPDATE keyword_suggestions \
         SET status = 'used', used_count = used_count + 1, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, client_id, theme, description, category, hooks, status, used_count, \
                   created_at, updated_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_keyword()
}

/// Marks a keyword used only if it belongs to `client_id`; `None` otherwise.
pub(crate) async fn mark_used_for_client(
    conn: &mut PgConnection,
    client_id: Uuid,
    id: Uuid,
) -> Result<Option<KeywordSuggestion>, DbError> {
    sqlx::query_as::<_, KeywordRow>(
        "UPDATE keyword_suggestions \
         SET status = 'used', used_count = used_count + 1, updated_at = NOW() \
         WHERE id = $1 AND client_id = $2 \
         RETURNING id, client_id, theme, description, category, hooks, status, used_count, \
                   created_at, updated_at",
    )
    .bind(id)
    .bind(client_id)
    .fetch_optional(&mut *conn)
    .await?
    .map(KeywordRow::into_keyword)
    .transpose()
}

/// Sets a keyword's status (archive / restore).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no keyword has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn set_keyword_status(
    pool: &PgPool,
    id: Uuid,
    status: KeywordStatus,
) -> Result<KeywordSuggestion, DbError> {
    let row = sqlx::query_as::<_, KeywordRow>(
        "UPDATE keyword_suggestions \
         SET status = $2, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, client_id, theme, description, category, hooks, status, used_count, \
                   created_at, updated_at",
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_keyword()
}

/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_keyword(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM keyword_suggestions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
