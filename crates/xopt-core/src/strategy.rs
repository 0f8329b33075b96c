//! Brand strategy: 22 free-text sections grouped into six categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::categories::StrategyCategory;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategySection {
    Mission,
    Vision,
    Values,
    SocialProof,
    Authority,
    AchievementsDetail,
    CareerDetail,
    PersonaDemographics,
    PersonaPsychographics,
    PersonaPainPoints,
    PersonaDesires,
    PersonaTriggers,
    UniqueFeatures,
    Differentiation,
    Expertise,
    Transformation,
    ProductsServices,
    ContentPillars,
    PostingStrategy,
    BackgroundStory,
    Passion,
    WhyNow,
}

impl StrategySection {
    /// Display order of the strategy page.
    pub const ALL: [StrategySection; 22] = [
        StrategySection::Mission,
        StrategySection::Vision,
        StrategySection::Values,
        StrategySection::SocialProof,
        StrategySection::Authority,
        StrategySection::AchievementsDetail,
        StrategySection::CareerDetail,
        StrategySection::PersonaDemographics,
        StrategySection::PersonaPsychographics,
        StrategySection::PersonaPainPoints,
        StrategySection::PersonaDesires,
        StrategySection::PersonaTriggers,
        StrategySection::UniqueFeatures,
        StrategySection::Differentiation,
        StrategySection::Expertise,
        StrategySection::Transformation,
        StrategySection::ProductsServices,
        StrategySection::ContentPillars,
        StrategySection::PostingStrategy,
        StrategySection::BackgroundStory,
        StrategySection::Passion,
        StrategySection::WhyNow,
    ];

    /// Column name and wire key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            StrategySection::Mission => "mission",
            StrategySection::Vision => "vision",
            StrategySection::Values => "values",
            StrategySection::SocialProof => "social_proof",
            StrategySection::Authority => "authority",
            StrategySection::AchievementsDetail => "achievements_detail",
            StrategySection::CareerDetail => "career_detail",
            StrategySection::PersonaDemographics => "persona_demographics",
            StrategySection::PersonaPsychographics => "persona_psychographics",
            StrategySection::PersonaPainPoints => "persona_pain_points",
            StrategySection::PersonaDesires => "persona_desires",
            StrategySection::PersonaTriggers => "persona_triggers",
            StrategySection::UniqueFeatures => "unique_features",
            StrategySection::Differentiation => "differentiation",
            StrategySection::Expertise => "expertise",
            StrategySection::Transformation => "transformation",
            StrategySection::ProductsServices => "products_services",
            StrategySection::ContentPillars => "content_pillars",
            StrategySection::PostingStrategy => "posting_strategy",
            StrategySection::BackgroundStory => "background_story",
            StrategySection::Passion => "passion",
            StrategySection::WhyNow => "why_now",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StrategySection::Mission => "ミッション",
            StrategySection::Vision => "ビジョン",
            StrategySection::Values => "価値観",
            StrategySection::SocialProof => "社会的証明",
            StrategySection::Authority => "権威性",
            StrategySection::AchievementsDetail => "実績詳細",
            StrategySection::CareerDetail => "経歴詳細",
            StrategySection::PersonaDemographics => "デモグラフィック",
            StrategySection::PersonaPsychographics => "サイコグラフィック",
            StrategySection::PersonaPainPoints => "悩み・課題",
            StrategySection::PersonaDesires => "願望・理想",
            StrategySection::PersonaTriggers => "行動トリガー",
            StrategySection::UniqueFeatures => "特徴",
            StrategySection::Differentiation => "差別化",
            StrategySection::Expertise => "提供ノウハウ",
            StrategySection::Transformation => "ビフォーアフター",
            StrategySection::ProductsServices => "商品・サービス",
            StrategySection::ContentPillars => "コンテンツの柱",
            StrategySection::PostingStrategy => "投稿戦略",
            StrategySection::BackgroundStory => "背景ストーリー",
            StrategySection::Passion => "想い・情熱",
            StrategySection::WhyNow => "なぜ今か",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            StrategySection::Mission => "何のために存在するのか",
            StrategySection::Vision => "実現したい未来像",
            StrategySection::Values => "大切にしている考え方",
            StrategySection::SocialProof => "フォロワー数、実績の数値",
            StrategySection::Authority => "専門性を示す資格・肩書き",
            StrategySection::AchievementsDetail => "具体的な成果・結果",
            StrategySection::CareerDetail => "キャリアの詳細ストーリー",
            StrategySection::PersonaDemographics => "年齢・性別・職業・収入",
            StrategySection::PersonaPsychographics => "心理特性・価値観・ライフスタイル",
            StrategySection::PersonaPainPoints => "抱えている問題点",
            StrategySection::PersonaDesires => "なりたい姿・手に入れたいもの",
            StrategySection::PersonaTriggers => "行動を起こすきっかけ",
            StrategySection::UniqueFeatures => "自分ならではの強み",
            StrategySection::Differentiation => "競合との違い",
            StrategySection::Expertise => "教えられる専門知識",
            StrategySection::Transformation => "提供できる変化",
            StrategySection::ProductsServices => "提供している商品やサービス",
            StrategySection::ContentPillars => "発信する主要テーマ",
            StrategySection::PostingStrategy => "投稿頻度・時間帯・形式",
            StrategySection::BackgroundStory => "なぜこの道を選んだか",
            StrategySection::Passion => "心から伝えたいこと",
            StrategySection::WhyNow => "今発信する理由",
        }
    }

    #[must_use]
    pub fn category(self) -> StrategyCategory {
        match self {
            StrategySection::Mission | StrategySection::Vision | StrategySection::Values => {
                StrategyCategory::Concept
            }
            StrategySection::SocialProof
            | StrategySection::Authority
            | StrategySection::AchievementsDetail
            | StrategySection::CareerDetail => StrategyCategory::Who,
            StrategySection::PersonaDemographics
            | StrategySection::PersonaPsychographics
            | StrategySection::PersonaPainPoints
            | StrategySection::PersonaDesires
            | StrategySection::PersonaTriggers => StrategyCategory::Persona,
            StrategySection::UniqueFeatures
            | StrategySection::Differentiation
            | StrategySection::Expertise
            | StrategySection::Transformation => StrategyCategory::What,
            StrategySection::ProductsServices
            | StrategySection::ContentPillars
            | StrategySection::PostingStrategy => StrategyCategory::How,
            StrategySection::BackgroundStory | StrategySection::Passion | StrategySection::WhyNow => {
                StrategyCategory::Why
            }
        }
    }

    /// Sections belonging to `category`, in display order.
    pub fn in_category(category: StrategyCategory) -> impl Iterator<Item = StrategySection> {
        Self::ALL.into_iter().filter(move |s| s.category() == category)
    }
}

impl std::fmt::Display for StrategySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for StrategySection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.key() == s)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "strategy section",
                value: s.to_string(),
            })
    }
}

/// The editable text of every section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyContent {
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
}

impl StrategyContent {
    fn slot(&self, section: StrategySection) -> &Option<String> {
        match section {
            StrategySection::Mission => &self.mission,
            StrategySection::Vision => &self.vision,
            StrategySection::Values => &self.values,
            StrategySection::SocialProof => &self.social_proof,
            StrategySection::Authority => &self.authority,
            StrategySection::AchievementsDetail => &self.achievements_detail,
            StrategySection::CareerDetail => &self.career_detail,
            StrategySection::PersonaDemographics => &self.persona_demographics,
            StrategySection::PersonaPsychographics => &self.persona_psychographics,
            StrategySection::PersonaPainPoints => &self.persona_pain_points,
            StrategySection::PersonaDesires => &self.persona_desires,
            StrategySection::PersonaTriggers => &self.persona_triggers,
            StrategySection::UniqueFeatures => &self.unique_features,
            StrategySection::Differentiation => &self.differentiation,
            StrategySection::Expertise => &self.expertise,
            StrategySection::Transformation => &self.transformation,
            StrategySection::ProductsServices => &self.products_services,
            StrategySection::ContentPillars => &self.content_pillars,
            StrategySection::PostingStrategy => &self.posting_strategy,
            StrategySection::BackgroundStory => &self.background_story,
            StrategySection::Passion => &self.passion,
            StrategySection::WhyNow => &self.why_now,
        }
    }

    fn slot_mut(&mut self, section: StrategySection) -> &mut Option<String> {
        match section {
            StrategySection::Mission => &mut self.mission,
            StrategySection::Vision => &mut self.vision,
            StrategySection::Values => &mut self.values,
            StrategySection::SocialProof => &mut self.social_proof,
            StrategySection::Authority => &mut self.authority,
            StrategySection::AchievementsDetail => &mut self.achievements_detail,
            StrategySection::CareerDetail => &mut self.career_detail,
            StrategySection::PersonaDemographics => &mut self.persona_demographics,
            StrategySection::PersonaPsychographics => &mut self.persona_psychographics,
            StrategySection::PersonaPainPoints => &mut self.persona_pain_points,
            StrategySection::PersonaDesires => &mut self.persona_desires,
            StrategySection::PersonaTriggers => &mut self.persona_triggers,
            StrategySection::UniqueFeatures => &mut self.unique_features,
            StrategySection::Differentiation => &mut self.differentiation,
            StrategySection::Expertise => &mut self.expertise,
            StrategySection::Transformation => &mut self.transformation,
            StrategySection::ProductsServices => &mut self.products_services,
            StrategySection::ContentPillars => &mut self.content_pillars,
            StrategySection::PostingStrategy => &mut self.posting_strategy,
            StrategySection::BackgroundStory => &mut self.background_story,
            StrategySection::Passion => &mut self.passion,
            StrategySection::WhyNow => &mut self.why_now,
        }
    }

    /// Section text, treating blank strings as unset.
    #[must_use]
    pub fn get(&self, section: StrategySection) -> Option<&str> {
        self.slot(section)
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    pub fn set(&mut self, section: StrategySection, text: Option<String>) {
        *self.slot_mut(section) = text;
    }

    /// Filled sections in display order.
    #[must_use]
    pub fn filled_sections(&self) -> Vec<(StrategySection, &str)> {
        StrategySection::ALL
            .into_iter()
            .filter_map(|section| self.get(section).map(|text| (section, text)))
            .collect()
    }

    /// Progress as `(filled, total)`.
    #[must_use]
    pub fn completion(&self) -> (usize, usize) {
        (self.filled_sections().len(), StrategySection::ALL.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandStrategy {
    pub id: Uuid,
    pub client_id: Uuid,
    #[serde(flatten)]
    pub content: StrategyContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
