//! Database operations for the `brand_strategies` table (one row per client).
//!
//! Section columns are bound in `StrategySection::ALL` order; the column list
//! below must stay in that order.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use xopt_core::{BrandStrategy, StrategyContent, StrategySection};

use crate::DbError;

macro_rules! strategy_columns {
    () => {
        "id, client_id, mission, vision, \"values\", social_proof, authority, \
         achievements_detail, career_detail, persona_demographics, persona_psychographics, \
         persona_pain_points, persona_desires, persona_triggers, unique_features, \
         differentiation, expertise, transformation, products_services, content_pillars, \
         posting_strategy, background_story, passion, why_now, created_at, updated_at"
    };
}

/// A row from the `brand_strategies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandStrategyRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub values: Option<String>,
    pub social_proof: Option<String>,
    pub authority: Option<String>,
    pub achievements_detail: Option<String>,
    pub career_detail: Option<String>,
    pub persona_demographics: Option<String>,
    pub persona_psychographics: Option<String>,
    pub persona_pain_points: Option<String>,
    pub persona_desires: Option<String>,
    pub persona_triggers: Option<String>,
    pub unique_features: Option<String>,
    pub differentiation: Option<String>,
    pub expertise: Option<String>,
    pub transformation: Option<String>,
    pub products_services: Option<String>,
    pub content_pillars: Option<String>,
    pub posting_strategy: Option<String>,
    pub background_story: Option<String>,
    pub passion: Option<String>,
    pub why_now: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BrandStrategyRow {
    #[must_use]
    pub fn into_strategy(self) -> BrandStrategy {
        BrandStrategy {
            id: self.id,
            client_id: self.client_id,
            content: StrategyContent {
                mission: self.mission,
                vision: self.vision,
                values: self.values,
                social_proof: self.social_proof,
                authority: self.authority,
                achievements_detail: self.achievements_detail,
                career_detail: self.career_detail,
                persona_demographics: self.persona_demographics,
                persona_psychographics: self.persona_psychographics,
                persona_pain_points: self.persona_pain_points,
                persona_desires: self.persona_desires,
                persona_triggers: self.persona_triggers,
                unique_features: self.unique_features,
                differentiation: self.differentiation,
                expertise: self.expertise,
                transformation: self.transformation,
                products_services: self.products_services,
                content_pillars: self.content_pillars,
                posting_strategy: self.posting_strategy,
                background_story: self.background_story,
                passion: self.passion,
                why_now: self.why_now,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Returns the client's brand strategy, or `None` if none has been saved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand_strategy(
    pool: &PgPool,
    client_id: Uuid,
) -> Result<Option<BrandStrategy>, DbError> {
    let row = sqlx::query_as::<_, BrandStrategyRow>(concat!(
        "SELECT ",
        strategy_columns!(),
        " FROM brand_strategies WHERE client_id = $1"
    ))
    .bind(client_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(BrandStrategyRow::into_strategy))
}

/// Inserts or replaces every section of the client's brand strategy.
///
/// Blank sections are stored as `NULL`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including an unknown
/// `client_id`).
pub async fn upsert_brand_strategy(
    pool: &PgPool,
    client_id: Uuid,
    content: &StrategyContent,
) -> Result<BrandStrategy, DbError> {
    let mut query = sqlx::query_as::<_, BrandStrategyRow>(concat!(
        "INSERT INTO brand_strategies (",
        strategy_columns!(),
        ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                  $17, $18, $19, $20, $21, $22, $23, $24, NOW(), NOW()) \
         ON CONFLICT (client_id) DO UPDATE SET \
             mission = EXCLUDED.mission, \
             vision = EXCLUDED.vision, \
             \"values\" = EXCLUDED.\"values\", \
             social_proof = EXCLUDED.social_proof, \
             authority = EXCLUDED.authority, \
             achievements_detail = EXCLUDED.achievements_detail, \
             career_detail = EXCLUDED.career_detail, \
             persona_demographics = EXCLUDED.persona_demographics, \
             persona_psychographics = EXCLUDED.persona_psychographics, \
             persona_pain_points = EXCLUDED.persona_pain_points, \
             persona_desires = EXCLUDED.persona_desires, \
             persona_triggers = EXCLUDED.persona_triggers, \
             unique_features = EXCLUDED.unique_features, \
             differentiation = EXCLUDED.differentiation, \
             expertise = EXCLUDED.expertise, \
             transformation = EXCLUDED.transformation, \
             products_services = EXCLUDED.products_services, \
             content_pillars = EXCLUDED.content_pillars, \
             posting_strategy = EXCLUDED.posting_strategy, \
             background_story = EXCLUDED.background_story, \
             passion = EXCLUDED.passion, \
             why_now = EXCLUDED.why_now, \
             updated_at = NOW() \
         RETURNING ",
        strategy_columns!()
    ))
    .bind(Uuid::new_v4())
    .bind(client_id);

    for section in StrategySection::ALL {
        query = query.bind(content.get(section));
    }

    let row = query.fetch_one(pool).await?;
    Ok(row.into_strategy())
}
