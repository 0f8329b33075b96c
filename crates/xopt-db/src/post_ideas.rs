//! Database operations for the `post_ideas` table.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use xopt_core::{character_count, IdeaStatus, KeywordSuggestion, PostCategory, PostIdea};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `post_ideas` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostIdeaRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub category: String,
    pub title: Option<String>,
    pub content: String,
    pub character_count: i32,
    pub tags: Vec<String>,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
    pub post_id: Option<String>,
    pub image_url: Option<String>,
    pub image_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostIdeaRow {
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] for an unknown category or status.
    pub fn into_idea(self) -> Result<PostIdea, DbError> {
        let category = self
            .category
            .parse::<PostCategory>()
            .map_err(|e| DbError::corrupt("post_ideas", e))?;
        let status = self
            .status
            .parse::<IdeaStatus>()
            .map_err(|e| DbError::corrupt("post_ideas", e))?;

        Ok(PostIdea {
            id: self.id,
            client_id: self.client_id,
            category,
            title: self.title,
            content: self.content,
            character_count: self.character_count,
            tags: self.tags,
            status,
            scheduled_at: self.scheduled_at,
            posted_at: self.posted_at,
            post_id: self.post_id,
            image_url: self.image_url,
            image_prompt: self.image_prompt,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields for a new idea. `character_count` is derived from `content`.
#[derive(Debug, Clone, Copy)]
pub struct NewPostIdea<'a> {
    pub client_id: Uuid,
    pub category: PostCategory,
    pub title: Option<&'a str>,
    pub content: &'a str,
    pub tags: &'a [String],
    pub status: IdeaStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Partial update for an idea. `None` keeps the stored value; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostIdeaUpdate<'a> {
    pub category: Option<PostCategory>,
    pub title: Option<Option<&'a str>>,
    pub content: Option<&'a str>,
    pub tags: Option<&'a [String]>,
    pub status: Option<IdeaStatus>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub posted_at: Option<Option<DateTime<Utc>>>,
    pub post_id: Option<Option<&'a str>>,
}

fn collect_ideas(rows: Vec<PostIdeaRow>) -> Result<Vec<PostIdea>, DbError> {
    rows.into_iter().map(PostIdeaRow::into_idea).collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the client's ideas, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn list_post_ideas(pool: &PgPool, client_id: Uuid) -> Result<Vec<PostIdea>, DbError> {
    let rows = sqlx::query_as::<_, PostIdeaRow>(
        "SELECT id, client_id, category, title, content, character_count, tags, status, \
                scheduled_at, posted_at, post_id, image_url, image_prompt, created_at, updated_at \
         FROM post_ideas \
         WHERE client_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    collect_ideas(rows)
}

/// Returns the non-empty titles of the client's ideas, used to steer keyword
/// generation away from covered themes.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_idea_titles(pool: &PgPool, client_id: Uuid) -> Result<Vec<String>, DbError> {
    let titles = sqlx::query_scalar::<_, String>(
        "SELECT title FROM post_ideas \
         WHERE client_id = $1 AND title IS NOT NULL AND title <> '' \
         ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    Ok(titles)
}

/// Returns a single idea by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn get_post_idea(pool: &PgPool, id: Uuid) -> Result<Option<PostIdea>, DbError> {
    let row = sqlx::query_as::<_, PostIdeaRow>(
        "SELECT id, client_id, category, title, content, character_count, tags, status, \
                scheduled_at, posted_at, post_id, image_url, image_prompt, created_at, updated_at \
         FROM post_ideas \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(PostIdeaRow::into_idea).transpose()
}

async fn insert_post_idea(
    conn: &mut PgConnection,
    idea: &NewPostIdea<'_>,
) -> Result<PostIdea, DbError> {
    let row = sqlx::query_as::<_, PostIdeaRow>(
        "INSERT INTO post_ideas \
           (id, client_id, category, title, content, character_count, tags, status, scheduled_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id, client_id, category, title, content, character_count, tags, status, \
                   scheduled_at, posted_at, post_id, image_url, image_prompt, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(idea.client_id)
    .bind(idea.category.as_str())
    .bind(idea.title)
    .bind(idea.content)
    .bind(character_count(idea.content))
    .bind(idea.tags)
    .bind(idea.status.as_str())
    .bind(idea.scheduled_at)
    .fetch_one(&mut *conn)
    .await?;

    row.into_idea()
}

/// Creates an idea and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_post_idea(pool: &PgPool, idea: &NewPostIdea<'_>) -> Result<PostIdea, DbError> {
    let mut conn = pool.acquire().await?;
    insert_post_idea(&mut conn, idea).await
}

/// Creates an idea written from one of the same client's keywords and marks
/// that keyword used. Both writes commit together or not at all.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the keyword does not exist or belongs to
/// another client (nothing is saved), or [`DbError::Sqlx`] if a query fails.
pub async fn create_post_idea_from_keyword(
    pool: &PgPool,
    idea: &NewPostIdea<'_>,
    keyword_id: Uuid,
) -> Result<(PostIdea, KeywordSuggestion), DbError> {
    let mut tx = pool.begin().await?;
    let saved = insert_post_idea(&mut tx, idea).await?;
    let keyword = crate::keywords::mark_used_for_client(&mut tx, idea.client_id, keyword_id)
        .await?
        .ok_or(DbError::NotFound)?;
    tx.commit().await?;
    Ok((saved, keyword))
}

/// Applies a partial update and returns the updated idea. A new `content`
/// also refreshes `character_count`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no idea has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_post_idea(
    pool: &PgPool,
    id: Uuid,
    update: &PostIdeaUpdate<'_>,
) -> Result<PostIdea, DbError> {
    let row = sqlx::query_as::<_, PostIdeaRow>(
        "UPDATE post_ideas \
         SET category        = COALESCE($2, category), \
             title           = CASE WHEN $3::BOOL THEN $4 ELSE title END, \
             content         = COALESCE($5, content), \
             character_count = COALESCE($6, character_count), \
             tags            = COALESCE($7, tags), \
             status          = COALESCE($8, status), \
             scheduled_at    = CASE WHEN $9::BOOL THEN $10 ELSE scheduled_at END, \
             posted_at       = CASE WHEN $11::BOOL THEN $12 ELSE posted_at END, \
             post_id         = CASE WHEN $13::BOOL THEN $14 ELSE post_id END, \
             updated_at      = NOW() \
         WHERE id = $1 \
         RETURNING id, client_id, category, title, content, character_count, tags, status, \
                   scheduled_at, posted_at, post_id, image_url, image_prompt, created_at, updated_at",
    )
    .bind(id)
    .bind(update.category.map(PostCategory::as_str))
    .bind(update.title.is_some())
    .bind(update.title.flatten())
    .bind(update.content)
    .bind(update.content.map(character_count))
    .bind(update.tags)
    .bind(update.status.map(IdeaStatus::as_str))
    .bind(update.scheduled_at.is_some())
    .bind(update.scheduled_at.flatten())
    .bind(update.posted_at.is_some())
    .bind(update.posted_at.flatten())
    .bind(update.post_id.is_some())
    .bind(update.post_id.flatten())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_idea()
}

/// Deletes an idea. Logs that referenced it keep their data with a `NULL`
/// `post_idea_id`.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_post_idea(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM post_ideas WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
