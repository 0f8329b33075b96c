use sqlx::PgPool;
use uuid::Uuid;
use xopt_core::LibraryFile;

use crate::DbError;

/// Entries processed by [`seed_library`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub hooks: usize,
    pub templates: usize,
}

/// Upsert the system hooks and templates from the library file.
///
/// System entries are keyed by `hook_text` / `name`; re-seeding refreshes
/// their text and reactivates them but never resets `usage_count`. All
/// upserts run inside a single transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_library(pool: &PgPool, library: &LibraryFile) -> Result<SeedCounts, DbError> {
    let mut tx = pool.begin().await?;
    let mut counts = SeedCounts::default();

    for hook in &library.hooks {
        sqlx::query(
            "INSERT INTO post_hooks \
               (id, client_id, category, hook_text, description, example_usage, is_system, is_active) \
             VALUES ($1, NULL, $2, $3, $4, $5, true, true) \
             ON CONFLICT (hook_text) WHERE is_system DO UPDATE SET \
                 category = EXCLUDED.category, \
                 description = EXCLUDED.description, \
                 example_usage = EXCLUDED.example_usage, \
                 is_active = true, \
                 updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(hook.category.as_str())
        .bind(&hook.hook_text)
        .bind(&hook.description)
        .bind(&hook.example_usage)
        .execute(&mut *tx)
        .await?;

        counts.hooks += 1;
    }

    for template in &library.templates {
        let structure = serde_json::to_value(&template.structure)
            .map_err(|e| DbError::Validation(e.to_string()))?;
        let reply_structure = serde_json::to_value(&template.reply_structure)
            .map_err(|e| DbError::Validation(e.to_string()))?;

        sqlx::query(
            "INSERT INTO post_templates \
               (id, client_id, name, description, category, structure, has_reply_thread, \
                reply_structure, is_system, is_active) \
             VALUES ($1, NULL, $2, $3, $4, $5, $6, $7, true, true) \
             ON CONFLICT (name) WHERE is_system DO UPDATE SET \
                 description = EXCLUDED.description, \
                 category = EXCLUDED.category, \
                 structure = EXCLUDED.structure, \
                 has_reply_thread = EXCLUDED.has_reply_thread, \
                 reply_structure = EXCLUDED.reply_structure, \
                 is_active = true, \
                 updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(&template.name)
        .bind(&template.description)
        .bind(template.category.as_str())
        .bind(structure)
        .bind(template.has_reply_thread)
        .bind(reply_structure)
        .execute(&mut *tx)
        .await?;

        counts.templates += 1;
    }

    tx.commit().await?;
    Ok(counts)
}
