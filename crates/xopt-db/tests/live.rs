//! Live integration tests for xopt-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/xopt-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::NaiveDate;
use uuid::Uuid;
use xopt_core::{
    parse_library, rank_month, summarize_month, DailyCounters, HookCategory, IdeaStatus,
    KeywordCategory, KeywordStatus, PostCategory, ProfileDesignInput, StrategyContent,
    StrategySection, TargetPersona, YearMonth,
};
use xopt_db::{
    create_client, create_daily_log, create_hook, create_keywords, create_post_idea,
    deactivate_hook, delete_client, get_brand_strategy, get_client, get_daily_log,
    get_profile_design, increment_hook_usage, list_active_hooks, list_active_templates,
    list_clients, list_daily_logs_for_month, list_keyword_themes, list_keywords, list_post_ideas,
    mark_keyword_used, seed_library, set_keyword_status, update_client, update_daily_log,
    update_post_idea, upsert_brand_strategy, upsert_profile_design, ClientUpdate, DbError,
    LogOrder, NewDailyLog, NewHook, NewKeyword, NewPostIdea, PostIdeaUpdate,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_test_client(pool: &sqlx::PgPool, name: &str) -> Uuid {
    create_client(pool, name, Some("handle"), None)
        .await
        .unwrap_or_else(|e| panic!("create_client failed for '{name}': {e}"))
        .id
}

fn counters(impressions: i64, profile_clicks: i64, follower_change: i64) -> DailyCounters {
    DailyCounters {
        impressions,
        likes: impressions / 50,
        profile_clicks,
        detail_clicks: 0,
        retweets: 0,
        replies: 1,
        replies_made: 0,
        follower_count: 1200,
        follower_change,
    }
}

fn new_log(day: NaiveDate, counters: DailyCounters) -> NewDailyLog<'static> {
    NewDailyLog {
        post_idea_id: None,
        log_date: day,
        post_type: Some(PostCategory::Useful),
        content: None,
        counters,
        tweet_url: None,
        analytics_url: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Section 1: Clients
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn client_crud_round_trip(pool: sqlx::PgPool) {
    let id = insert_test_client(&pool, "Acme").await;

    let updated = update_client(
        &pool,
        id,
        ClientUpdate {
            name: Some("Acme Consulting"),
            x_handle: Some(None),
            x_user_id: None,
        },
    )
    .await
    .expect("update_client failed");
    assert_eq!(updated.name, "Acme Consulting");
    assert!(updated.x_handle.is_none());

    let listed = list_clients(&pool).await.expect("list_clients failed");
    assert_eq!(listed.len(), 1);

    assert!(delete_client(&pool, id).await.expect("delete failed"));
    assert!(get_client(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_unknown_client_is_not_found(pool: sqlx::PgPool) {
    let result = update_client(&pool, Uuid::new_v4(), ClientUpdate::default()).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_client_cascades_to_logs(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Cascade").await;
    let log = create_daily_log(&pool, client_id, &new_log(date(2025, 3, 1), counters(100, 5, 1)))
        .await
        .expect("create_daily_log failed");

    delete_client(&pool, client_id).await.unwrap();

    assert!(get_daily_log(&pool, log.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Section 2: Profile design and brand strategy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn profile_design_upsert_replaces_existing(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Profile").await;
    assert!(get_profile_design(&pool, client_id).await.unwrap().is_none());

    let persona = TargetPersona {
        age_range: Some("30代".to_string()),
        pain_points: vec!["集客".to_string()],
        ..TargetPersona::default()
    };
    let first = ProfileDesignInput {
        target_persona: Some(persona.clone()),
        what_to_deliver: Some("SNS運用".to_string()),
        ..ProfileDesignInput::default()
    };
    let saved = upsert_profile_design(&pool, client_id, &first).await.unwrap();
    assert_eq!(saved.target_persona, Some(persona));

    let second = ProfileDesignInput {
        profile_text: Some("新しいプロフィール".to_string()),
        ..ProfileDesignInput::default()
    };
    let replaced = upsert_profile_design(&pool, client_id, &second).await.unwrap();
    assert_eq!(replaced.id, saved.id);
    assert!(replaced.target_persona.is_none());
    assert_eq!(replaced.profile_text.as_deref(), Some("新しいプロフィール"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn brand_strategy_stores_every_section(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Strategy").await;

    let mut content = StrategyContent::default();
    for section in StrategySection::ALL {
        content.set(section, Some(format!("{}の内容", section.label())));
    }
    content.set(StrategySection::WhyNow, Some("   ".to_string()));

    upsert_brand_strategy(&pool, client_id, &content).await.unwrap();
    let stored = get_brand_strategy(&pool, client_id)
        .await
        .unwrap()
        .expect("strategy should exist");

    assert_eq!(stored.content.get(StrategySection::Values), Some("価値観の内容"));
    assert_eq!(stored.content.why_now, None);
    assert_eq!(stored.content.completion(), (21, 22));
}

// ---------------------------------------------------------------------------
// Section 3: Ideas and keywords
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn post_idea_counts_characters_and_updates(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Ideas").await;
    let tags = vec!["朝活".to_string()];

    let idea = create_post_idea(
        &pool,
        &NewPostIdea {
            client_id,
            category: PostCategory::Useful,
            title: Some("朝活のすすめ"),
            content: "早起きは三文の徳",
            tags: &tags,
            status: IdeaStatus::Draft,
            scheduled_at: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(idea.character_count, 8);

    let updated = update_post_idea(
        &pool,
        idea.id,
        &PostIdeaUpdate {
            content: Some("早起き"),
            status: Some(IdeaStatus::Posted),
            ..PostIdeaUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.character_count, 3);
    assert_eq!(updated.status, IdeaStatus::Posted);
    assert_eq!(updated.title.as_deref(), Some("朝活のすすめ"));
    assert_eq!(updated.tags, tags);

    let listed = list_post_ideas(&pool, client_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn keyword_use_marks_used_and_counts(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Keywords").await;
    let hooks = vec!["知らないと損".to_string()];

    let saved = create_keywords(
        &pool,
        client_id,
        &[
            NewKeyword {
                theme: "時短術",
                description: Some("家事の時短"),
                category: KeywordCategory::Useful,
                hooks: &hooks,
            },
            NewKeyword {
                theme: "失敗談",
                description: None,
                category: KeywordCategory::Empathy,
                hooks: &[],
            },
        ],
    )
    .await
    .unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|k| k.status == KeywordStatus::Unused));

    let used = mark_keyword_used(&pool, saved[0].id).await.unwrap();
    let used = mark_keyword_used(&pool, used.id).await.unwrap();
    assert_eq!(used.status, KeywordStatus::Used);
    assert_eq!(used.used_count, 2);

    set_keyword_status(&pool, saved[1].id, KeywordStatus::Archived)
        .await
        .unwrap();
    let unused = list_keywords(&pool, client_id, Some(KeywordStatus::Unused))
        .await
        .unwrap();
    assert!(unused.is_empty());

    let themes = list_keyword_themes(&pool, client_id).await.unwrap();
    assert_eq!(themes.len(), 2);
}

// ---------------------------------------------------------------------------
// Section 4: Daily logs feeding analytics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn daily_log_write_computes_rates(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Logs").await;

    let log = create_daily_log(&pool, client_id, &new_log(date(2025, 4, 2), counters(2000, 50, 5)))
        .await
        .unwrap();
    assert!((log.profile_click_rate - 2.5).abs() < 1e-9);
    assert!((log.follow_rate - 10.0).abs() < 1e-9);

    let edited = update_daily_log(&pool, log.id, &new_log(date(2025, 4, 2), counters(0, 0, -2)))
        .await
        .unwrap();
    assert_eq!(edited.profile_click_rate, 0.0);
    assert_eq!(edited.follow_rate, 0.0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn negative_counter_is_rejected_before_insert(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Negative").await;
    let mut bad = counters(10, 1, 0);
    bad.retweets = -1;

    let result = create_daily_log(&pool, client_id, &new_log(date(2025, 4, 2), bad)).await;
    assert!(matches!(result, Err(DbError::Validation(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn month_listing_feeds_summary_and_rankings(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Analytics").await;
    let other_client = insert_test_client(&pool, "Other").await;

    for (day, imp, pc, fc) in [(1, 100, 10, 1), (15, 1000, 10, 2), (31, 500, 5, -1)] {
        create_daily_log(&pool, client_id, &new_log(date(2025, 5, day), counters(imp, pc, fc)))
            .await
            .unwrap();
    }
    // Outside the month and belonging to another client.
    create_daily_log(&pool, client_id, &new_log(date(2025, 6, 1), counters(9999, 1, 1)))
        .await
        .unwrap();
    create_daily_log(&pool, other_client, &new_log(date(2025, 5, 2), counters(9999, 1, 1)))
        .await
        .unwrap();

    let month: YearMonth = "2025-05".parse().unwrap();
    let records = list_daily_logs_for_month(&pool, client_id, month, LogOrder::Impressions)
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].counters.impressions, 1000);

    let summary = summarize_month(client_id, month, &records).expect("summary");
    assert_eq!(summary.total_impressions, 1600);
    assert_eq!(summary.total_profile_clicks, 25);
    assert!((summary.profile_click_rate - 25.0 / 1600.0 * 100.0).abs() < 1e-9);

    let rankings = rank_month(&records);
    let by_change: Vec<i64> = rankings
        .follower_change
        .iter()
        .map(|r| r.counters.follower_change)
        .collect();
    assert_eq!(by_change, [2, 1, -1]);

    let by_date = list_daily_logs_for_month(&pool, client_id, month, LogOrder::LogDate)
        .await
        .unwrap();
    assert_eq!(by_date[0].log_date, date(2025, 5, 1));
    assert_eq!(by_date[2].log_date, date(2025, 5, 31));
}

// ---------------------------------------------------------------------------
// Section 5: Library
// ---------------------------------------------------------------------------

const LIBRARY: &str = r"
hooks:
  - {category: urgent, hook_text: 【警告】}
  - {category: question, hook_text: なぜ？}
templates:
  - name: 基本型
    category: value
    structure:
      - {order: 1, name: 導入, prompt: 結論を書く}
";

#[sqlx::test(migrations = "../../migrations")]
async fn seeding_is_idempotent_and_keeps_usage(pool: sqlx::PgPool) {
    let library = parse_library(LIBRARY).unwrap();

    let counts = seed_library(&pool, &library).await.unwrap();
    assert_eq!(counts.hooks, 2);
    assert_eq!(counts.templates, 1);

    let hooks = list_active_hooks(&pool, Some(HookCategory::Urgent), None)
        .await
        .unwrap();
    assert_eq!(hooks.len(), 1);
    increment_hook_usage(&pool, hooks[0].id).await.unwrap();

    seed_library(&pool, &library).await.unwrap();

    let all = list_active_hooks(&pool, None, None).await.unwrap();
    assert_eq!(all.len(), 2);
    let urgent = all.iter().find(|h| h.category == HookCategory::Urgent).unwrap();
    assert_eq!(urgent.usage_count, 1);
    assert!(urgent.is_system);

    let templates = list_active_templates(&pool, None, None).await.unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].structure[0].name, "導入");
}

#[sqlx::test(migrations = "../../migrations")]
async fn deactivated_hooks_leave_listing(pool: sqlx::PgPool) {
    let client_id = insert_test_client(&pool, "Hooks").await;
    let hook = create_hook(
        &pool,
        &NewHook {
            client_id: Some(client_id),
            category: HookCategory::Number,
            hook_text: "3つの理由",
            description: None,
            example_usage: None,
        },
    )
    .await
    .unwrap();
    assert!(!hook.is_system);

    let scoped = list_active_hooks(&pool, None, Some(client_id)).await.unwrap();
    assert_eq!(scoped.len(), 1);
    let other_scope = list_active_hooks(&pool, None, Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert!(other_scope.is_empty());

    assert!(deactivate_hook(&pool, hook.id).await.unwrap());
    assert!(!deactivate_hook(&pool, hook.id).await.unwrap());
    assert!(list_active_hooks(&pool, None, None).await.unwrap().is_empty());
}
