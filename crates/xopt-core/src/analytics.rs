//! Monthly aggregation and top-N rankings over a client's daily logs.
//!
//! Both functions are pure: the caller fetches the month's records (scoped to
//! one client and `[first_day, last_day]`) and hands them over as a slice.

use serde::Serialize;
use uuid::Uuid;

use crate::daily_log::{follow_rate, profile_click_rate, DailyLogRecord};
use crate::month::YearMonth;

/// Entries kept per ranking.
pub const RANKING_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub client_id: Uuid,
    pub year_month: YearMonth,
    pub tweet_count: usize,
    pub total_impressions: i64,
    pub total_likes: i64,
    pub total_profile_clicks: i64,
    pub total_detail_clicks: i64,
    pub total_replies_received: i64,
    pub follower_change: i64,
    pub avg_impressions: f64,
    pub avg_likes: f64,
    pub avg_profile_clicks: f64,
    /// From the month's totals, not an average of daily rates.
    pub profile_click_rate: f64,
    pub follow_rate: f64,
}

/// Fold a month of records into one summary. `None` when there are no records.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize_month(
    client_id: Uuid,
    year_month: YearMonth,
    records: &[DailyLogRecord],
) -> Option<MonthlySummary> {
    if records.is_empty() {
        return None;
    }

    let sum = |field: fn(&DailyLogRecord) -> i64| records.iter().map(field).sum::<i64>();

    let total_impressions = sum(|r: &DailyLogRecord| r.counters.impressions);
    let total_likes = sum(|r: &DailyLogRecord| r.counters.likes);
    let total_profile_clicks = sum(|r: &DailyLogRecord| r.counters.profile_clicks);
    let total_detail_clicks = sum(|r: &DailyLogRecord| r.counters.detail_clicks);
    let total_replies_received = sum(|r: &DailyLogRecord| r.counters.replies);
    let follower_change = sum(|r: &DailyLogRecord| r.counters.follower_change);

    let tweet_count = records.len();
    let count = tweet_count as f64;

    Some(MonthlySummary {
        client_id,
        year_month,
        tweet_count,
        total_impressions,
        total_likes,
        total_profile_clicks,
        total_detail_clicks,
        total_replies_received,
        follower_change,
        avg_impressions: total_impressions as f64 / count,
        avg_likes: total_likes as f64 / count,
        avg_profile_clicks: total_profile_clicks as f64 / count,
        profile_click_rate: profile_click_rate(total_profile_clicks, total_impressions),
        follow_rate: follow_rate(follower_change, total_profile_clicks),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingDimension {
    Impressions,
    Likes,
    ProfileClicks,
    FollowerChange,
}

impl RankingDimension {
    pub const ALL: [RankingDimension; 4] = [
        RankingDimension::Impressions,
        RankingDimension::Likes,
        RankingDimension::ProfileClicks,
        RankingDimension::FollowerChange,
    ];

    #[must_use]
    pub fn value(self, record: &DailyLogRecord) -> i64 {
        match self {
            RankingDimension::Impressions => record.counters.impressions,
            RankingDimension::Likes => record.counters.likes,
            RankingDimension::ProfileClicks => record.counters.profile_clicks,
            RankingDimension::FollowerChange => record.counters.follower_change,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RankingDimension::Impressions => "impressions",
            RankingDimension::Likes => "likes",
            RankingDimension::ProfileClicks => "profile_clicks",
            RankingDimension::FollowerChange => "follower_change",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RankingDimension::Impressions => "インプレッション",
            RankingDimension::Likes => "いいね",
            RankingDimension::ProfileClicks => "プロフクリック",
            RankingDimension::FollowerChange => "フォロワー増減",
        }
    }
}

/// Top `limit` records by `dimension`, highest first.
///
/// The sort is stable, so equal values keep their input order. `records`
/// itself is left untouched.
#[must_use]
pub fn top_records(
    records: &[DailyLogRecord],
    dimension: RankingDimension,
    limit: usize,
) -> Vec<&DailyLogRecord> {
    let mut ranked: Vec<&DailyLogRecord> = records.iter().collect();
    ranked.sort_by(|a, b| dimension.value(b).cmp(&dimension.value(a)));
    ranked.truncate(limit);
    ranked
}

/// The four leaderboards shown on the analytics page.
#[derive(Debug, Clone, PartialEq)]
pub struct Rankings<'a> {
    pub impressions: Vec<&'a DailyLogRecord>,
    pub likes: Vec<&'a DailyLogRecord>,
    pub profile_clicks: Vec<&'a DailyLogRecord>,
    pub follower_change: Vec<&'a DailyLogRecord>,
}

impl<'a> Rankings<'a> {
    #[must_use]
    pub fn get(&self, dimension: RankingDimension) -> &[&'a DailyLogRecord] {
        match dimension {
            RankingDimension::Impressions => &self.impressions,
            RankingDimension::Likes => &self.likes,
            RankingDimension::ProfileClicks => &self.profile_clicks,
            RankingDimension::FollowerChange => &self.follower_change,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        RankingDimension::ALL.iter().all(|d| self.get(*d).is_empty())
    }
}

#[must_use]
pub fn rank_month(records: &[DailyLogRecord]) -> Rankings<'_> {
    Rankings {
        impressions: top_records(records, RankingDimension::Impressions, RANKING_SIZE),
        likes: top_records(records, RankingDimension::Likes, RANKING_SIZE),
        profile_clicks: top_records(records, RankingDimension::ProfileClicks, RANKING_SIZE),
        follower_change: top_records(records, RankingDimension::FollowerChange, RANKING_SIZE),
    }
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
