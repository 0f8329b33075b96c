//! Offline unit tests for xopt-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use chrono::{NaiveDate, Utc};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use uuid::Uuid;
use xopt_core::{AppConfig, Environment, HookCategory, PostCategory, TargetPersona};
use xopt_db::{DailyLogRow, DbError, HookRow, PoolConfig, ProfileDesignRow, TemplateRow};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        library_path: PathBuf::from("./config/library.yaml"),
        state_path: PathBuf::from("./.xopt-state.json"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        anthropic_api_key: None,
        generator_model: "claude-sonnet-4-20250514".to_string(),
        generator_base_url: "https://api.anthropic.com".to_string(),
        generator_timeout_secs: 120,
        generator_max_retries: 2,
        generator_retry_backoff_base_ms: 1000,
    }
}

fn daily_log_row(post_type: Option<&str>) -> DailyLogRow {
    DailyLogRow {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        post_idea_id: None,
        log_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        post_type: post_type.map(str::to_string),
        content: Some("朝の投稿".to_string()),
        impressions: 1000,
        likes: 20,
        profile_clicks: 30,
        detail_clicks: 5,
        retweets: 2,
        replies: 3,
        replies_made: 1,
        follower_count: 5400,
        follower_change: -3,
        profile_click_rate: 3.0,
        follow_rate: -10.0,
        tweet_url: None,
        analytics_url: None,
        created_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn daily_log_row_converts_to_record() {
    let record = daily_log_row(Some("empathy")).into_record().unwrap();

    assert_eq!(record.post_type, Some(PostCategory::Empathy));
    assert_eq!(record.counters.impressions, 1000);
    assert_eq!(record.counters.follower_change, -3);
    assert!((record.follow_rate + 10.0).abs() < 1e-9);
    assert_eq!(record.display_label(), "朝の投稿");
}

#[test]
fn daily_log_row_with_unknown_post_type_is_corrupt() {
    let err = daily_log_row(Some("viral")).into_record().unwrap_err();
    assert!(matches!(err, DbError::CorruptRow { table: "daily_logs", .. }));
}

#[test]
fn daily_log_row_without_post_type_is_fine() {
    let record = daily_log_row(None).into_record().unwrap();
    assert!(record.post_type.is_none());
}

#[test]
fn hook_row_converts_category() {
    let row = HookRow {
        id: Uuid::new_v4(),
        client_id: None,
        category: "question".to_string(),
        hook_text: "なぜ？".to_string(),
        description: None,
        example_usage: None,
        usage_count: 4,
        is_system: true,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let hook = row.into_hook().unwrap();
    assert_eq!(hook.category, HookCategory::Question);
    assert_eq!(hook.usage_count, 4);
}

#[test]
fn template_row_with_bad_structure_is_corrupt() {
    let row = TemplateRow {
        id: Uuid::new_v4(),
        client_id: None,
        name: "壊れたテンプレ".to_string(),
        description: None,
        category: "story".to_string(),
        structure: serde_json::json!({"not": "an array"}),
        has_reply_thread: false,
        reply_structure: serde_json::json!([]),
        usage_count: 0,
        is_system: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    assert!(matches!(
        row.into_template(),
        Err(DbError::CorruptRow { table: "post_templates", .. })
    ));
}

#[test]
fn profile_row_decodes_persona_envelope() {
    let persona = TargetPersona {
        job_title: Some("看護師".to_string()),
        ..TargetPersona::default()
    };
    let row = ProfileDesignRow {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        target_persona: Some(persona.to_stored()),
        what_to_deliver: None,
        future_promise: None,
        achievements: None,
        career_history: None,
        profile_text: None,
        header_copy: None,
        fixed_tweet: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let design = row.into_design().unwrap();
    assert_eq!(design.target_persona, Some(persona));
}

#[test]
fn profile_row_with_unversioned_persona_is_corrupt() {
    let row = ProfileDesignRow {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        target_persona: Some(serde_json::json!({"version": 9, "persona": {}})),
        what_to_deliver: None,
        future_promise: None,
        achievements: None,
        career_history: None,
        profile_text: None,
        header_copy: None,
        fixed_tweet: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    assert!(matches!(
        row.into_design(),
        Err(DbError::CorruptRow { table: "profile_designs", .. })
    ));
}
