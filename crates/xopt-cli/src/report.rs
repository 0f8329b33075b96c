//! Log listing and the monthly report.
//!
//! Formatting is split into pure `*_lines` functions so it can be tested
//! without a database.

use xopt_core::{
    follow_rate_rating, profile_click_rating, Client, DailyLogRecord, MonthlySummary,
    RankingDimension, Rankings, YearMonth,
};

const LABEL_WIDTH: usize = 30;

/// Shortens `text` to `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > width {
        format!("{}...", single_line.chars().take(width).collect::<String>())
    } else {
        single_line
    }
}

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn rated(rate: f64, symbol: &str) -> String {
    format!("{rate:.2}% {symbol}")
}

pub(crate) fn log_lines(records: &[DailyLogRecord]) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<12}{:<9}{:>10}{:>8}{:>8}{:>8}  {:<12}{:<12}CONTENT",
        "DATE", "TYPE", "IMPR", "LIKES", "CLICKS", "FOLLOW", "CLICK RATE", "FOLLOW RATE"
    )];
    for record in records {
        let post_type = record.post_type.map_or("\u{2014}", |t| t.label());
        lines.push(format!(
            "{:<12}{:<9}{:>10}{:>8}{:>8}{:>8}  {:<12}{:<12}{}",
            record.log_date.format("%Y-%m-%d"),
            post_type,
            record.counters.impressions,
            record.counters.likes,
            record.counters.profile_clicks,
            signed(record.counters.follower_change),
            rated(
                record.profile_click_rate,
                profile_click_rating(record.profile_click_rate).symbol()
            ),
            rated(
                record.follow_rate,
                follow_rate_rating(record.follow_rate).symbol()
            ),
            truncate(record.content.as_deref().unwrap_or(""), LABEL_WIDTH),
        ));
    }
    lines
}

pub(crate) fn summary_lines(summary: &MonthlySummary) -> Vec<String> {
    vec![
        format!("Posts               {}", summary.tweet_count),
        format!(
            "Impressions         {} (avg {:.1})",
            summary.total_impressions, summary.avg_impressions
        ),
        format!(
            "Likes               {} (avg {:.1})",
            summary.total_likes, summary.avg_likes
        ),
        format!(
            "Profile clicks      {} (avg {:.1})",
            summary.total_profile_clicks, summary.avg_profile_clicks
        ),
        format!("Detail clicks       {}", summary.total_detail_clicks),
        format!("Replies received    {}", summary.total_replies_received),
        format!("Follower change     {}", signed(summary.follower_change)),
        format!(
            "Profile click rate  {}",
            rated(
                summary.profile_click_rate,
                profile_click_rating(summary.profile_click_rate).symbol()
            )
        ),
        format!(
            "Follow rate         {}",
            rated(
                summary.follow_rate,
                follow_rate_rating(summary.follow_rate).symbol()
            )
        ),
    ]
}

pub(crate) fn ranking_lines(rankings: &Rankings<'_>, dimension: RankingDimension) -> Vec<String> {
    let mut lines = vec![format!("Top 5 \u{00b7} {}", dimension.label())];
    let entries = rankings.get(dimension);
    if entries.is_empty() {
        lines.push("  (no data)".to_string());
        return lines;
    }
    for (idx, record) in entries.iter().enumerate() {
        let value = dimension.value(record);
        let value = if dimension == RankingDimension::FollowerChange {
            signed(value)
        } else {
            value.to_string()
        };
        lines.push(format!(
            "  {}. {:>8}  {}",
            idx + 1,
            value,
            truncate(&record.display_label(), LABEL_WIDTH)
        ));
    }
    lines
}

pub(crate) async fn run_logs_list(
    pool: &sqlx::PgPool,
    client: &Client,
    month: YearMonth,
) -> anyhow::Result<()> {
    let records =
        xopt_db::list_daily_logs_for_month(pool, client.id, month, xopt_db::LogOrder::LogDate)
            .await?;
    if records.is_empty() {
        println!("no logs for {} in {month}", client.name);
        return Ok(());
    }

    println!("{} \u{00b7} {month}", client.name);
    for line in log_lines(&records) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) async fn run_report(
    pool: &sqlx::PgPool,
    client: &Client,
    month: YearMonth,
) -> anyhow::Result<()> {
    let records =
        xopt_db::list_daily_logs_for_month(pool, client.id, month, xopt_db::LogOrder::Impressions)
            .await?;

    println!("# {} \u{00b7} {month}", client.name);
    println!();
    let Some(summary) = xopt_core::summarize_month(client.id, month, &records) else {
        println!("no logs recorded for this month");
        return Ok(());
    };
    for line in summary_lines(&summary) {
        println!("{line}");
    }

    let rankings = xopt_core::rank_month(&records);
    for dimension in RankingDimension::ALL {
        println!();
        for line in ranking_lines(&rankings, dimension) {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;
    use xopt_core::{DailyCounters, PostCategory};

    use super::*;

    fn record(day: u32, impressions: i64, follower_change: i64, content: Option<&str>) -> DailyLogRecord {
        let counters = DailyCounters {
            impressions,
            profile_clicks: 40,
            follower_change,
            ..DailyCounters::default()
        };
        DailyLogRecord {
            id: Uuid::new_v4(),
            client_id: Uuid::nil(),
            post_idea_id: None,
            log_date: NaiveDate::from_ymd_opt(2025, 6, day).expect("date"),
            post_type: Some(PostCategory::Useful),
            content: content.map(str::to_string),
            profile_click_rate: counters.profile_click_rate(),
            follow_rate: counters.follow_rate(),
            counters,
            tweet_url: None,
            analytics_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn truncate_cuts_long_labels_on_char_boundaries() {
        assert_eq!(truncate("短い", 5), "短い");
        assert_eq!(truncate("あいうえおかきく", 5), "あいうえお...");
        assert_eq!(truncate("一行目\n二行目", 20), "一行目 二行目");
    }

    #[test]
    fn signed_marks_gains() {
        assert_eq!(signed(3), "+3");
        assert_eq!(signed(0), "0");
        assert_eq!(signed(-2), "-2");
    }

    #[test]
    fn summary_lines_include_rates_with_symbols() {
        let records = vec![record(1, 1_000, 2, None), record(2, 1_000, 2, None)];
        let month: YearMonth = "2025-06".parse().expect("month");
        let summary = xopt_core::summarize_month(Uuid::nil(), month, &records).expect("summary");
        let lines = summary_lines(&summary);
        assert_eq!(lines[0], "Posts               2");
        // 80 clicks / 2 000 impressions = 4 %, 4 follows / 80 clicks = 5 %.
        assert!(lines[7].ends_with("4.00% ○"), "{}", lines[7]);
        assert!(lines[8].ends_with("5.00% ◎"), "{}", lines[8]);
        assert_eq!(lines[6], "Follower change     +4");
    }

    #[test]
    fn ranking_lines_number_entries_and_fall_back_to_dates() {
        let records = vec![
            record(1, 500, -1, Some("朝活のすすめ")),
            record(2, 900, 3, None),
        ];
        let rankings = xopt_core::rank_month(&records);
        let lines = ranking_lines(&rankings, RankingDimension::Impressions);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("  1."));
        assert!(lines[1].ends_with("2025-06-02"));
        assert!(lines[2].ends_with("朝活のすすめ"));

        let follower = ranking_lines(&rankings, RankingDimension::FollowerChange);
        assert!(follower[1].contains("+3"));
    }

    #[test]
    fn empty_ranking_says_so() {
        let rankings = xopt_core::rank_month(&[]);
        let lines = ranking_lines(&rankings, RankingDimension::Likes);
        assert_eq!(lines[1], "  (no data)");
    }

    #[test]
    fn log_lines_have_a_header_and_one_row_per_record() {
        let lines = log_lines(&[record(3, 1_000, 1, Some("本文"))]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("DATE"));
        assert!(lines[1].starts_with("2025-06-03"));
        assert!(lines[1].ends_with("本文"));
    }
}
