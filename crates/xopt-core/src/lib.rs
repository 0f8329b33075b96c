pub mod analytics;
pub mod app_config;
pub mod categories;
pub mod config;
pub mod context;
pub mod daily_log;
pub mod ideas;
pub mod library;
pub mod month;
pub mod profile;
pub mod rating;
pub mod strategy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use analytics::{
    rank_month, summarize_month, top_records, MonthlySummary, RankingDimension, Rankings,
    RANKING_SIZE,
};
pub use app_config::{AppConfig, Environment};
pub use categories::{
    HookCategory, IdeaStatus, KeywordCategory, KeywordStatus, PostCategory, StrategyCategory,
    TemplateCategory,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use context::AppContext;
pub use daily_log::{follow_rate, profile_click_rate, DailyCounters, DailyLogRecord};
pub use ideas::{character_count, parse_tags, IdeaFilter, KeywordSuggestion, PostIdea};
pub use library::{
    load_library, parse_library, LibraryFile, PostHook, PostTemplate, TemplateStructurePart,
};
pub use month::YearMonth;
pub use profile::{ProfileDesign, ProfileDesignInput, TargetPersona};
pub use rating::{follow_rate_rating, profile_click_rating, Rating};
pub use strategy::{BrandStrategy, StrategyContent, StrategySection};

/// A consultant's client: one managed X account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub x_handle: Option<String>,
    pub x_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid year-month '{0}'; expected YYYY-MM")]
    InvalidYearMonth(String),

    #[error("unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("counter '{field}' must be non-negative, got {value}")]
    NegativeCounter { field: &'static str, value: i64 },

    #[error("unsupported persona encoding version {0}")]
    UnsupportedPersonaVersion(u64),

    #[error("persona decode error: {0}")]
    PersonaDecode(#[source] serde_json::Error),

    #[error("failed to access state file {path}: {source}")]
    StateIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse state file: {0}")]
    StateParse(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read library file {path}: {source}")]
    LibraryFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse library file: {0}")]
    LibraryFileParse(#[source] serde_yaml::Error),

    #[error("library validation failed: {0}")]
    Validation(String),
}
