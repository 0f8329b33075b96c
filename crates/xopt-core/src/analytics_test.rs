use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::*;
use crate::daily_log::DailyCounters;

fn month() -> YearMonth {
    "2025-05".parse().unwrap()
}

fn log(day: u32, impressions: i64, likes: i64, profile_clicks: i64, follower_change: i64) -> DailyLogRecord {
    let counters = DailyCounters {
        impressions,
        likes,
        profile_clicks,
        detail_clicks: impressions / 10,
        retweets: 1,
        replies: 2,
        replies_made: 3,
        follower_count: 1000,
        follower_change,
    };
    DailyLogRecord {
        id: Uuid::new_v4(),
        client_id: Uuid::nil(),
        post_idea_id: None,
        log_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
        post_type: None,
        content: Some(format!("post {day}")),
        profile_click_rate: counters.profile_click_rate(),
        follow_rate: counters.follow_rate(),
        counters,
        tweet_url: None,
        analytics_url: None,
        created_at: Utc::now(),
    }
}

fn sample() -> Vec<DailyLogRecord> {
    vec![
        log(1, 1200, 30, 12, 2),
        log(2, 800, 12, 4, -1),
        log(3, 3000, 90, 40, 6),
    ]
}

#[test]
fn totals_are_arithmetic_sums() {
    let records = sample();
    let summary = summarize_month(Uuid::nil(), month(), &records).unwrap();

    assert_eq!(summary.tweet_count, 3);
    assert_eq!(summary.total_impressions, 5000);
    assert_eq!(summary.total_likes, 132);
    assert_eq!(summary.total_profile_clicks, 56);
    assert_eq!(summary.total_detail_clicks, 120 + 80 + 300);
    assert_eq!(summary.total_replies_received, 6);
    assert_eq!(summary.follower_change, 7);
}

#[test]
fn averages_divide_totals_by_count() {
    let records = sample();
    let summary = summarize_month(Uuid::nil(), month(), &records).unwrap();

    assert!((summary.avg_likes - 132.0 / 3.0).abs() < 1e-9);
    assert!((summary.avg_impressions - 5000.0 / 3.0).abs() < 1e-9);
    assert!((summary.avg_profile_clicks - 56.0 / 3.0).abs() < 1e-9);
}

#[test]
fn rates_come_from_totals_not_daily_average() {
    let records = vec![log(1, 100, 0, 10, 0), log(2, 1000, 0, 10, 0)];
    let summary = summarize_month(Uuid::nil(), month(), &records).unwrap();

    let expected = 20.0 / 1100.0 * 100.0;
    assert!((summary.profile_click_rate - expected).abs() < 1e-9);
    assert!((summary.profile_click_rate - 5.5).abs() > 1.0);
}

#[test]
fn follow_rate_uses_total_profile_clicks() {
    let records = sample();
    let summary = summarize_month(Uuid::nil(), month(), &records).unwrap();
    assert!((summary.follow_rate - 7.0 / 56.0 * 100.0).abs() < 1e-9);
}

#[test]
fn zero_impressions_give_zero_rates() {
    let records = vec![log(1, 0, 0, 0, 3), log(2, 0, 0, 0, -1)];
    let summary = summarize_month(Uuid::nil(), month(), &records).unwrap();

    assert_eq!(summary.profile_click_rate, 0.0);
    assert_eq!(summary.follow_rate, 0.0);
    assert!(!summary.profile_click_rate.is_nan());
}

#[test]
fn empty_month_has_no_summary_and_empty_rankings() {
    assert!(summarize_month(Uuid::nil(), month(), &[]).is_none());

    let rankings = rank_month(&[]);
    assert!(rankings.is_empty());
    for dimension in RankingDimension::ALL {
        assert!(rankings.get(dimension).is_empty());
    }
}

#[test]
fn ranking_is_descending_and_stable() {
    let records = vec![
        log(1, 50, 0, 0, 0),
        log(2, 200, 0, 0, 0),
        log(3, 200, 0, 0, 0),
        log(4, 10, 0, 0, 0),
        log(5, 75, 0, 0, 0),
    ];
    let top = top_records(&records, RankingDimension::Impressions, RANKING_SIZE);

    let values: Vec<i64> = top.iter().map(|r| r.counters.impressions).collect();
    assert_eq!(values, [200, 200, 75, 50, 10]);
    assert_eq!(top[0].id, records[1].id);
    assert_eq!(top[1].id, records[2].id);
}

#[test]
fn ranking_truncates_to_five() {
    let records: Vec<DailyLogRecord> = (1..=8).map(|d| log(d, i64::from(d) * 10, 0, 0, 0)).collect();
    let rankings = rank_month(&records);

    assert_eq!(rankings.impressions.len(), 5);
    assert_eq!(rankings.impressions[0].counters.impressions, 80);
    assert_eq!(rankings.impressions[4].counters.impressions, 40);
}

#[test]
fn fewer_than_five_records_returns_all() {
    let records = sample();
    let rankings = rank_month(&records);
    assert_eq!(rankings.likes.len(), 3);
}

#[test]
fn rankings_do_not_reorder_input() {
    let records = sample();
    let before: Vec<Uuid> = records.iter().map(|r| r.id).collect();

    let rankings = rank_month(&records);
    let after: Vec<Uuid> = records.iter().map(|r| r.id).collect();

    assert_eq!(before, after);
    assert_eq!(rankings.impressions[0].id, records[2].id);
    assert_eq!(rankings.follower_change[2].id, records[1].id);
}

#[test]
fn follower_change_ranks_negative_last() {
    let records = sample();
    let rankings = rank_month(&records);
    let values: Vec<i64> = rankings
        .follower_change
        .iter()
        .map(|r| r.counters.follower_change)
        .collect();
    assert_eq!(values, [6, 2, -1]);
}

#[test]
fn summarize_is_idempotent() {
    let records = sample();
    let first = summarize_month(Uuid::nil(), month(), &records);
    let second = summarize_month(Uuid::nil(), month(), &records);
    assert_eq!(first, second);
}
