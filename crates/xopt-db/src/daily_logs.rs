//! Database operations for the `daily_logs` table.
//!
//! Writes validate the counters and store both rates computed from the same
//! day's counters; reads never recompute them.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use xopt_core::{DailyCounters, DailyLogRecord, PostCategory, YearMonth};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `daily_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyLogRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub post_idea_id: Option<Uuid>,
    pub log_date: NaiveDate,
    pub post_type: Option<String>,
    pub content: Option<String>,
    pub impressions: i64,
    pub likes: i64,
    pub profile_clicks: i64,
    pub detail_clicks: i64,
    pub retweets: i64,
    pub replies: i64,
    pub replies_made: i64,
    pub follower_count: i64,
    pub follower_change: i64,
    pub profile_click_rate: f64,
    pub follow_rate: f64,
    pub tweet_url: Option<String>,
    pub analytics_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyLogRow {
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] for an unknown `post_type`.
    pub fn into_record(self) -> Result<DailyLogRecord, DbError> {
        let post_type = self
            .post_type
            .as_deref()
            .map(str::parse::<PostCategory>)
            .transpose()
            .map_err(|e| DbError::corrupt("daily_logs", e))?;

        Ok(DailyLogRecord {
            id: self.id,
            client_id: self.client_id,
            post_idea_id: self.post_idea_id,
            log_date: self.log_date,
            post_type,
            content: self.content,
            counters: DailyCounters {
                impressions: self.impressions,
                likes: self.likes,
                profile_clicks: self.profile_clicks,
                detail_clicks: self.detail_clicks,
                retweets: self.retweets,
                replies: self.replies,
                replies_made: self.replies_made,
                follower_count: self.follower_count,
                follower_change: self.follower_change,
            },
            profile_click_rate: self.profile_click_rate,
            follow_rate: self.follow_rate,
            tweet_url: self.tweet_url,
            analytics_url: self.analytics_url,
            created_at: self.created_at,
        })
    }
}

/// Everything entered for one log. Used for both insert and full replace.
#[derive(Debug, Clone, Copy)]
pub struct NewDailyLog<'a> {
    pub post_idea_id: Option<Uuid>,
    pub log_date: NaiveDate,
    pub post_type: Option<PostCategory>,
    pub content: Option<&'a str>,
    pub counters: DailyCounters,
    pub tweet_url: Option<&'a str>,
    pub analytics_url: Option<&'a str>,
}

/// Sort order for log listings. Ties fall back to `log_date, created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOrder {
    /// Calendar order, for the log table.
    LogDate,
    /// Highest impressions first, the order analytics reads in.
    Impressions,
}

fn collect_records(rows: Vec<DailyLogRow>) -> Result<Vec<DailyLogRecord>, DbError> {
    rows.into_iter().map(DailyLogRow::into_record).collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the client's logs with `from <= log_date <= to`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn list_daily_logs_between(
    pool: &PgPool,
    client_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    order: LogOrder,
) -> Result<Vec<DailyLogRecord>, DbError> {
    let sql = match order {
        LogOrder::LogDate => {
            "SELECT id, client_id, post_idea_id, log_date, post_type, content, impressions, likes, \
                    profile_clicks, detail_clicks, retweets, replies, replies_made, follower_count, \
                    follower_change, profile_click_rate, follow_rate, tweet_url, analytics_url, created_at \
             FROM daily_logs \
             WHERE client_id = $1 AND log_date >= $2 AND log_date <= $3 \
             ORDER BY log_date, created_at"
        }
        LogOrder::Impressions => {
            "SELECT id, client_id, post_idea_id, log_date, post_type, content, impressions, likes, \
                    profile_clicks, detail_clicks, retweets, replies, replies_made, follower_count, \
                    follower_change, profile_click_rate, follow_rate, tweet_url, analytics_url, created_at \
             FROM daily_logs \
             WHERE client_id = $1 AND log_date >= $2 AND log_date <= $3 \
             ORDER BY impressions DESC, log_date, created_at"
        }
    };

    let rows = sqlx::query_as::<_, DailyLogRow>(sql)
        .bind(client_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;

    collect_records(rows)
}

/// Returns the client's logs for one calendar month.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn list_daily_logs_for_month(
    pool: &PgPool,
    client_id: Uuid,
    month: YearMonth,
    order: LogOrder,
) -> Result<Vec<DailyLogRecord>, DbError> {
    list_daily_logs_between(pool, client_id, month.first_day(), month.last_day(), order).await
}

/// Returns a single log by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::CorruptRow`]
/// for an unreadable row.
pub async fn get_daily_log(pool: &PgPool, id: Uuid) -> Result<Option<DailyLogRecord>, DbError> {
    let row = sqlx::query_as::<_, DailyLogRow>(
        "SELECT id, client_id, post_idea_id, log_date, post_type, content, impressions, likes, \
                profile_clicks, detail_clicks, retweets, replies, replies_made, follower_count, \
                follower_change, profile_click_rate, follow_rate, tweet_url, analytics_url, created_at \
         FROM daily_logs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(DailyLogRow::into_record).transpose()
}

/// Records a day's metrics and returns the stored log.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for a negative counter, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_daily_log(
    pool: &PgPool,
    client_id: Uuid,
    log: &NewDailyLog<'_>,
) -> Result<DailyLogRecord, DbError> {
    log.counters
        .validate()
        .map_err(|e| DbError::Validation(e.to_string()))?;
    let c = &log.counters;

    let row = sqlx::query_as::<_, DailyLogRow>(
        "INSERT INTO daily_logs \
           (id, client_id, post_idea_id, log_date, post_type, content, impressions, likes, \
            profile_clicks, detail_clicks, retweets, replies, replies_made, follower_count, \
            follower_change, profile_click_rate, follow_rate, tweet_url, analytics_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
         RETURNING id, client_id, post_idea_id, log_date, post_type, content, impressions, likes, \
                   profile_clicks, detail_clicks, retweets, replies, replies_made, follower_count, \
                   follower_change, profile_click_rate, follow_rate, tweet_url, analytics_url, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(client_id)
    .bind(log.post_idea_id)
    .bind(log.log_date)
    .bind(log.post_type.map(PostCategory::as_str))
    .bind(log.content)
    .bind(c.impressions)
    .bind(c.likes)
    .bind(c.profile_clicks)
    .bind(c.detail_clicks)
    .bind(c.retweets)
    .bind(c.replies)
    .bind(c.replies_made)
    .bind(c.follower_count)
    .bind(c.follower_change)
    .bind(c.profile_click_rate())
    .bind(c.follow_rate())
    .bind(log.tweet_url)
    .bind(log.analytics_url)
    .fetch_one(pool)
    .await?;

    row.into_record()
}

/// Replaces every editable field of a log, recomputing both rates.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for a negative counter,
/// [`DbError::NotFound`] if no log has this id, or [`DbError::Sqlx`] if the
/// update fails.
pub async fn update_daily_log(
    pool: &PgPool,
    id: Uuid,
    log: &NewDailyLog<'_>,
) -> Result<DailyLogRecord, DbError> {
    log.counters
        .validate()
        .map_err(|e| DbError::Validation(e.to_string()))?;
    let c = &log.counters;

    let row = sqlx::query_as::<_, DailyLogRow>(
        "UPDATE daily_logs \
         SET post_idea_id       = $2, \
             log_date           = $3, \
             post_type          = $4, \
             content            = $5, \
             impressions        = $6, \
             likes              = $7, \
             profile_clicks     = $8, \
             detail_clicks      = $9, \
             retweets           = $10, \
             replies            = $11, \
             replies_made       = $12, \
             follower_count     = $13, \
             follower_change    = $14, \
             profile_click_rate = $15, \
             follow_rate        = $16, \
             tweet_url          = $17, \
             analytics_url      = $18 \
         WHERE id = $1 \
         RETURNING id, client_id, post_idea_id, log_date, post_type, content, impressions, likes, \
                   profile_clicks, detail_clicks, retweets, replies, replies_made, follower_count, \
                   follower_change, profile_click_rate, follow_rate, tweet_url, analytics_url, created_at",
    )
    .bind(id)
    .bind(log.post_idea_id)
    .bind(log.log_date)
    .bind(log.post_type.map(PostCategory::as_str))
    .bind(log.content)
    .bind(c.impressions)
    .bind(c.likes)
    .bind(c.profile_clicks)
    .bind(c.detail_clicks)
    .bind(c.retweets)
    .bind(c.replies)
    .bind(c.replies_made)
    .bind(c.follower_count)
    .bind(c.follower_change)
    .bind(c.profile_click_rate())
    .bind(c.follow_rate())
    .bind(log.tweet_url)
    .bind(log.analytics_url)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_record()
}

/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_daily_log(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM daily_logs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
