//! Database operations for the `clients` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use xopt_core::Client;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `clients` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub name: String,
    pub x_handle: Option<String>,
    pub x_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientRow {
    #[must_use]
    pub fn into_client(self) -> Client {
        Client {
            id: self.id,
            name: self.name,
            x_handle: self.x_handle,
            x_user_id: self.x_user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update for a client. `None` keeps the stored value; for the
/// nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientUpdate<'a> {
    pub name: Option<&'a str>,
    pub x_handle: Option<Option<&'a str>>,
    pub x_user_id: Option<Option<&'a str>>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all clients, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_clients(pool: &PgPool) -> Result<Vec<Client>, DbError> {
    let rows = sqlx::query_as::<_, ClientRow>(
        "SELECT id, name, x_handle, x_user_id, created_at, updated_at \
         FROM clients \
         ORDER BY created_at, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ClientRow::into_client).collect())
}

/// Returns a single client by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_client(pool: &PgPool, id: Uuid) -> Result<Option<Client>, DbError> {
    let row = sqlx::query_as::<_, ClientRow>(
        "SELECT id, name, x_handle, x_user_id, created_at, updated_at \
         FROM clients \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ClientRow::into_client))
}

/// Creates a client and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_client(
    pool: &PgPool,
    name: &str,
    x_handle: Option<&str>,
    x_user_id: Option<&str>,
) -> Result<Client, DbError> {
    let row = sqlx::query_as::<_, ClientRow>(
        "INSERT INTO clients (id, name, x_handle, x_user_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, name, x_handle, x_user_id, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(x_handle)
    .bind(x_user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.into_client())
}

/// Applies a partial update and returns the updated client.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no client has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_client(
    pool: &PgPool,
    id: Uuid,
    update: ClientUpdate<'_>,
) -> Result<Client, DbError> {
    let row = sqlx::query_as::<_, ClientRow>(
        "UPDATE clients \
         SET name       = COALESCE($2, name), \
             x_handle   = CASE WHEN $3::BOOL THEN $4 ELSE x_handle END, \
             x_user_id  = CASE WHEN $5::BOOL THEN $6 ELSE x_user_id END, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, name, x_handle, x_user_id, created_at, updated_at",
    )
    .bind(id)
    .bind(update.name)
    .bind(update.x_handle.is_some())
    .bind(update.x_handle.flatten())
    .bind(update.x_user_id.is_some())
    .bind(update.x_user_id.flatten())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row.into_client())
}

/// Deletes a client and, through `ON DELETE CASCADE`, everything it owns.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_client(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
