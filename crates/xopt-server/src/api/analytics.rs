//! Monthly analytics: summary, rating classification, and top-5 rankings.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;
use xopt_core::{DailyLogRecord, MonthlySummary, RankingDimension, Rankings, YearMonth};

use crate::middleware::RequestId;

use super::logs::MonthQuery;
use super::{
    map_db_error, parse_month, resolve_client, respond, ApiError, ApiResponse, AppState,
    RatingPair,
};

#[derive(Debug, Serialize)]
pub(super) struct MonthlyAnalytics {
    pub month: YearMonth,
    pub summary: Option<MonthlySummary>,
    pub ratings: Option<RatingPair>,
    pub rankings: RankingsData,
}

#[derive(Debug, Serialize, Default)]
pub(super) struct RankingsData {
    pub impressions: Vec<RankedEntry>,
    pub likes: Vec<RankedEntry>,
    pub profile_clicks: Vec<RankedEntry>,
    pub follower_change: Vec<RankedEntry>,
}

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct RankedEntry {
    pub rank: usize,
    pub id: Uuid,
    pub log_date: NaiveDate,
    pub label: String,
    pub value: i64,
}

fn ranked(rankings: &Rankings<'_>, dimension: RankingDimension) -> Vec<RankedEntry> {
    rankings
        .get(dimension)
        .iter()
        .enumerate()
        .map(|(idx, record)| RankedEntry {
            rank: idx + 1,
            id: record.id,
            log_date: record.log_date,
            label: record.display_label(),
            value: dimension.value(record),
        })
        .collect()
}

pub(super) fn build_analytics(
    client_id: Uuid,
    month: YearMonth,
    records: &[DailyLogRecord],
) -> MonthlyAnalytics {
    let summary = xopt_core::summarize_month(client_id, month, records);
    let ratings = summary
        .as_ref()
        .map(|s| RatingPair::from_rates(s.profile_click_rate, s.follow_rate));
    let rankings = xopt_core::rank_month(records);

    MonthlyAnalytics {
        month,
        summary,
        ratings,
        rankings: RankingsData {
            impressions: ranked(&rankings, RankingDimension::Impressions),
            likes: ranked(&rankings, RankingDimension::Likes),
            profile_clicks: ranked(&rankings, RankingDimension::ProfileClicks),
            follower_change: ranked(&rankings, RankingDimension::FollowerChange),
        },
    }
}

pub(super) async fn monthly_analytics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ApiResponse<MonthlyAnalytics>>, ApiError> {
    let rid = &req_id.0;
    let month = parse_month(rid, query.month.as_deref())?;
    resolve_client(&state.pool, id, rid).await?;

    let records =
        xopt_db::list_daily_logs_for_month(&state.pool, id, month, xopt_db::LogOrder::Impressions)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::debug!(client_id = %id, %month, records = records.len(), "monthly analytics");
    Ok(respond(req_id, build_analytics(id, month, &records)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use xopt_core::{DailyCounters, Rating};

    use super::*;

    fn record(day: u32, impressions: i64, profile_clicks: i64, follower_change: i64) -> DailyLogRecord {
        let counters = DailyCounters {
            impressions,
            profile_clicks,
            follower_change,
            ..DailyCounters::default()
        };
        DailyLogRecord {
            id: Uuid::new_v4(),
            client_id: Uuid::nil(),
            post_idea_id: None,
            log_date: NaiveDate::from_ymd_opt(2025, 4, day).expect("date"),
            post_type: None,
            content: None,
            profile_click_rate: counters.profile_click_rate(),
            follow_rate: counters.follow_rate(),
            counters,
            tweet_url: None,
            analytics_url: None,
            created_at: Utc::now(),
        }
    }

    fn april() -> YearMonth {
        "2025-04".parse().expect("month")
    }

    #[test]
    fn empty_month_has_no_summary_and_empty_rankings() {
        let data = build_analytics(Uuid::nil(), april(), &[]);
        assert!(data.summary.is_none());
        assert!(data.ratings.is_none());
        assert!(data.rankings.impressions.is_empty());
        assert!(data.rankings.follower_change.is_empty());
    }

    #[test]
    fn ratings_follow_the_monthly_rates() {
        // 2 500 profile clicks over 100 000 impressions = 2.5 %; 250 / 2 500 = 10 %.
        let records = vec![record(1, 60_000, 1_500, 150), record(2, 40_000, 1_000, 100)];
        let data = build_analytics(Uuid::nil(), april(), &records);
        let ratings = data.ratings.expect("ratings");
        assert_eq!(ratings.profile_click.rating, Rating::Fair);
        assert_eq!(ratings.profile_click.symbol, "△");
        assert_eq!(ratings.follow.rating, Rating::Best);
    }

    #[test]
    fn rankings_are_numbered_from_one_and_labelled_by_date() {
        let records = vec![record(3, 10, 0, -2), record(4, 30, 0, 5)];
        let data = build_analytics(Uuid::nil(), april(), &records);
        let top = &data.rankings.impressions[0];
        assert_eq!(top.rank, 1);
        assert_eq!(top.value, 30);
        assert_eq!(top.label, "2025-04-04");
        assert_eq!(data.rankings.follower_change[1].value, -2);
    }
}
