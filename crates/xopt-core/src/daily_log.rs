//! Per-post daily performance records and the write-time rate formulas.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::categories::PostCategory;
use crate::CoreError;

/// Raw counters entered for one post on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyCounters {
    pub impressions: i64,
    pub likes: i64,
    pub profile_clicks: i64,
    pub detail_clicks: i64,
    pub retweets: i64,
    pub replies: i64,
    pub replies_made: i64,
    pub follower_count: i64,
    /// Signed; a day can lose followers.
    pub follower_change: i64,
}

impl DailyCounters {
    /// Reject any negative counter. `follower_change` is exempt.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NegativeCounter` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let checked = [
            ("impressions", self.impressions),
            ("likes", self.likes),
            ("profile_clicks", self.profile_clicks),
            ("detail_clicks", self.detail_clicks),
            ("retweets", self.retweets),
            ("replies", self.replies),
            ("replies_made", self.replies_made),
            ("follower_count", self.follower_count),
        ];
        for (field, value) in checked {
            if value < 0 {
                return Err(CoreError::NegativeCounter { field, value });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn profile_click_rate(&self) -> f64 {
        profile_click_rate(self.profile_clicks, self.impressions)
    }

    #[must_use]
    pub fn follow_rate(&self) -> f64 {
        follow_rate(self.follower_change, self.profile_clicks)
    }
}

/// Profile clicks as a percentage of impressions; 0 when nothing was shown.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn profile_click_rate(profile_clicks: i64, impressions: i64) -> f64 {
    if impressions > 0 {
        profile_clicks as f64 / impressions as f64 * 100.0
    } else {
        0.0
    }
}

/// Net follower change per profile click, in percent. May be negative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn follow_rate(follower_change: i64, profile_clicks: i64) -> f64 {
    if profile_clicks > 0 {
        follower_change as f64 / profile_clicks as f64 * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogRecord {
    pub id: Uuid,
    pub client_id: Uuid,
    pub post_idea_id: Option<Uuid>,
    pub log_date: NaiveDate,
    pub post_type: Option<PostCategory>,
    pub content: Option<String>,
    #[serde(flatten)]
    pub counters: DailyCounters,
    pub profile_click_rate: f64,
    pub follow_rate: f64,
    pub tweet_url: Option<String>,
    pub analytics_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyLogRecord {
    /// Content snapshot when one was saved, otherwise the log date.
    #[must_use]
    pub fn display_label(&self) -> String {
        match self.content.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.log_date.format("%Y-%m-%d").to_string(),
        }
    }
}
