//! Database operations for the `post_hooks` and `post_templates` tables.
//!
//! Removing an entry only deactivates it; usage counts survive.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use xopt_core::{HookCategory, PostHook, PostTemplate, TemplateCategory, TemplateStructurePart};

use crate::DbError;

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// A row from the `post_hooks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HookRow {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub category: String,
    pub hook_text: String,
    pub description: Option<String>,
    pub example_usage: Option<String>,
    pub usage_count: i32,
    pub is_system: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HookRow {
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] for an unknown category.
    pub fn into_hook(self) -> Result<PostHook, DbError> {
        let category = self
            .category
            .parse::<HookCategory>()
            .map_err(|e| DbError::corrupt("post_hooks", e))?;

        Ok(PostHook {
            id: self.id,
            client_id: self.client_id,
            category,
            hook_text: self.hook_text,
            description: self.description,
            example_usage: self.example_usage,
            usage_count: self.usage_count,
            is_system: self.is_system,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewHook<'a> {
    pub client_id: Option<Uuid>,
    pub category: HookCategory,
    pub hook_text: &'a str,
    pub description: Option<&'a str>,
    pub example_usage: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HookUpdate<'a> {
    pub category: Option<HookCategory>,
    pub hook_text: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub example_usage: Option<Option<&'a str>>,
}

/// Returns active hooks ordered by category, most used first.
///
/// With `client_id`, only system hooks and that client's own hooks are
/// returned.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn list_active_hooks(
    pool: &PgPool,
    category: Option<HookCategory>,
    client_id: Option<Uuid>,
) -> Result<Vec<PostHook>, DbError> {
    let rows = sqlx::query_as::<_, HookRow>(
        "SELECT id, client_id, category, hook_text, description, example_usage, usage_count, \
                is_system, is_active, created_at, updated_at \
         FROM post_hooks \
         WHERE is_active = true \
           AND ($1::TEXT IS NULL OR category = $1) \
           AND ($2::UUID IS NULL OR client_id IS NULL OR client_id = $2) \
         ORDER BY category, usage_count DESC, created_at",
    )
    .bind(category.map(HookCategory::as_str))
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(HookRow::into_hook).collect()
}

/// Returns a hook by id (active or not), or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn get_hook(pool: &PgPool, id: Uuid) -> Result<Option<PostHook>, DbError> {
    let row = sqlx::query_as::<_, HookRow>(
        "SELECT id, client_id, category, hook_text, description, example_usage, usage_count, \
                is_system, is_active, created_at, updated_at \
         FROM post_hooks \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(HookRow::into_hook).transpose()
}

/// Creates a user hook (never a system one).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_hook(pool: &PgPool, hook: &NewHook<'_>) -> Result<PostHook, DbError> {
    let row = sqlx::query_as::<_, HookRow>(
        "INSERT INTO post_hooks \
           (id, client_id, category, hook_text, description, example_usage, is_system, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, false, true) \
         RETURNING id, client_id, category, hook_text, description, example_usage, usage_count, \
                   is_system, is_active, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(hook.client_id)
    .bind(hook.category.as_str())
    .bind(hook.hook_text)
    .bind(hook.description)
    .bind(hook.example_usage)
    .fetch_one(pool)
    .await?;

    row.into_hook()
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no hook has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_hook(
    pool: &PgPool,
    id: Uuid,
    update: &HookUpdate<'_>,
) -> Result<PostHook, DbError> {
    let row = sqlx::query_as::<_, HookRow>(
        "UPDATE post_hooks \
         SET category      = COALESCE($2, category), \
             hook_text     = COALESCE($3, hook_text), \
             description   = CASE WHEN $4::BOOL THEN $5 ELSE description END, \
             example_usage = CASE WHEN $6::BOOL THEN $7 ELSE example_usage END, \
             updated_at    = NOW() \
         WHERE id = $1 \
         RETURNING id, client_id, category, hook_text, description, example_usage, usage_count, \
                   is_system, is_active, created_at, updated_at",
    )
    .bind(id)
    .bind(update.category.map(HookCategory::as_str))
    .bind(update.hook_text)
    .bind(update.description.is_some())
    .bind(update.description.flatten())
    .bind(update.example_usage.is_some())
    .bind(update.example_usage.flatten())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_hook()
}

/// Hides a hook from listings. Returns `true` if an active hook was hidden.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_hook(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE post_hooks \
         SET is_active = false, updated_at = NOW() \
         WHERE id = $1 AND is_active = true",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no hook has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn increment_hook_usage(pool: &PgPool, id: Uuid) -> Result<PostHook, DbError> {
    let row = sqlx::query_as::<_, HookRow>(
        "UPDATE post_hooks \
         SET usage_count = usage_count + 1, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, client_id, category, hook_text, description, example_usage, usage_count, \
                   is_system, is_active, created_at, updated_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_hook()
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// A row from the `post_templates` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub structure: serde_json::Value,
    pub has_reply_thread: bool,
    pub reply_structure: serde_json::Value,
    pub usage_count: i32,
    pub is_system: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemplateRow {
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] for an unknown category or a structure
    /// that does not decode.
    pub fn into_template(self) -> Result<PostTemplate, DbError> {
        let category = self
            .category
            .parse::<TemplateCategory>()
            .map_err(|e| DbError::corrupt("post_templates", e))?;
        let structure: Vec<TemplateStructurePart> = serde_json::from_value(self.structure)
            .map_err(|e| DbError::corrupt("post_templates", e))?;
        let reply_structure: Vec<TemplateStructurePart> =
            serde_json::from_value(self.reply_structure)
                .map_err(|e| DbError::corrupt("post_templates", e))?;

        Ok(PostTemplate {
            id: self.id,
            client_id: self.client_id,
            name: self.name,
            description: self.description,
            category,
            structure,
            has_reply_thread: self.has_reply_thread,
            reply_structure,
            usage_count: self.usage_count,
            is_system: self.is_system,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewTemplate<'a> {
    pub client_id: Option<Uuid>,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: TemplateCategory,
    pub structure: &'a [TemplateStructurePart],
    pub has_reply_thread: bool,
    pub reply_structure: &'a [TemplateStructurePart],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub category: Option<TemplateCategory>,
    pub structure: Option<&'a [TemplateStructurePart]>,
    pub has_reply_thread: Option<bool>,
    pub reply_structure: Option<&'a [TemplateStructurePart]>,
}

fn structure_json(parts: &[TemplateStructurePart]) -> serde_json::Value {
    serde_json::to_value(parts).unwrap_or_else(|_| serde_json::Value::Array(Vec::new()))
}

/// Returns active templates ordered by category, most used first.
///
/// With `client_id`, only system templates and that client's own templates
/// are returned.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn list_active_templates(
    pool: &PgPool,
    category: Option<TemplateCategory>,
    client_id: Option<Uuid>,
) -> Result<Vec<PostTemplate>, DbError> {
    let rows = sqlx::query_as::<_, TemplateRow>(
        "SELECT id, client_id, name, description, category, structure, has_reply_thread, \
                reply_structure, usage_count, is_system, is_active, created_at, updated_at \
         FROM post_templates \
         WHERE is_active = true \
           AND ($1::TEXT IS NULL OR category = $1) \
           AND ($2::UUID IS NULL OR client_id IS NULL OR client_id = $2) \
         ORDER BY category, usage_count DESC, created_at",
    )
    .bind(category.map(TemplateCategory::as_str))
    .bind(client_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TemplateRow::into_template).collect()
}

/// Returns a template by id (active or not), or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn get_template(pool: &PgPool, id: Uuid) -> Result<Option<PostTemplate>, DbError> {
    let row = sqlx::query_as::<_, TemplateRow>(
        "SELECT id, client_id, name, description, category, structure, has_reply_thread, \
                reply_structure, usage_count, is_system, is_active, created_at, updated_at \
         FROM post_templates \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(TemplateRow::into_template).transpose()
}

/// Creates a user template (never a system one).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_template(
    pool: &PgPool,
    template: &NewTemplate<'_>,
) -> Result<PostTemplate, DbError> {
    let row = sqlx::query_as::<_, TemplateRow>(
        "INSERT INTO post_templates \
           (id, client_id, name, description, category, structure, has_reply_thread, \
            reply_structure, is_system, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, true) \
         RETURNING id, client_id, name, description, category, structure, has_reply_thread, \
                   reply_structure, usage_count, is_system, is_active, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(template.client_id)
    .bind(template.name)
    .bind(template.description)
    .bind(template.category.as_str())
    .bind(structure_json(template.structure))
    .bind(template.has_reply_thread)
    .bind(structure_json(template.reply_structure))
    .fetch_one(pool)
    .await?;

    row.into_template()
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no template has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_template(
    pool: &PgPool,
    id: Uuid,
    update: &TemplateUpdate<'_>,
) -> Result<PostTemplate, DbError> {
    let row = sqlx::query_as::<_, TemplateRow>(
        "UPDATE post_templates \
         SET name             = COALESCE($2, name), \
             description      = CASE WHEN $3::BOOL THEN $4 ELSE description END, \
             category         = COALESCE($5, category), \
             structure        = COALESCE($6, structure), \
             has_reply_thread = COALESCE($7, has_reply_thread), \
             reply_structure  = COALESCE($8, reply_structure), \
             updated_at       = NOW() \
         WHERE id = $1 \
         RETURNING id, client_id, name, description, category, structure, has_reply_thread, \
                   reply_structure, usage_count, is_system, is_active, created_at, updated_at",
    )
    .bind(id)
    .bind(update.name)
    .bind(update.description.is_some())
    .bind(update.description.flatten())
    .bind(update.category.map(TemplateCategory::as_str))
    .bind(update.structure.map(structure_json))
    .bind(update.has_reply_thread)
    .bind(update.reply_structure.map(structure_json))
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_template()
}

/// Hides a template from listings. Returns `true` if an active template was
/// hidden.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_template(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE post_templates \
         SET is_active = false, updated_at = NOW() \
         WHERE id = $1 AND is_active = true",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no template has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn increment_template_usage(pool: &PgPool, id: Uuid) -> Result<PostTemplate, DbError> {
    let row = sqlx::query_as::<_, TemplateRow>(
        "UPDATE post_templates \
         SET usage_count = usage_count + 1, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, client_id, name, description, category, structure, has_reply_thread, \
                   reply_structure, usage_count, is_system, is_active, created_at, updated_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_template()
}
