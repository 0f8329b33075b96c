//! Closed category enumerations shared across the dashboard.
//!
//! Every enum stores as its lowercase key (`as_str`), parses back through
//! `FromStr`, and carries its display label (and colour where the dashboard
//! paints one) through an exhaustive `match`.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Generates `ALL`, `as_str`, `Display` and `FromStr` for a key-backed enum.
macro_rules! keyed_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $key:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Useful,
    Empathy,
    Other,
}

keyed_enum!(PostCategory, "post category", {
    Useful => "useful",
    Empathy => "empathy",
    Other => "other",
});

impl PostCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PostCategory::Useful => "有益",
            PostCategory::Empathy => "共感",
            PostCategory::Other => "その他",
        }
    }

    /// Wording used inside generation prompts.
    #[must_use]
    pub fn prompt_label(self) -> &'static str {
        match self {
            PostCategory::Useful => "有益系",
            PostCategory::Empathy => "共感系",
            PostCategory::Other => "その他",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    Draft,
    Scheduled,
    Posted,
}

keyed_enum!(IdeaStatus, "idea status", {
    Draft => "draft",
    Scheduled => "scheduled",
    Posted => "posted",
});

impl IdeaStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            IdeaStatus::Draft => "下書き",
            IdeaStatus::Scheduled => "予定",
            IdeaStatus::Posted => "投稿済み",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    Useful,
    Empathy,
}

keyed_enum!(KeywordCategory, "keyword category", {
    Useful => "useful",
    Empathy => "empathy",
});

impl KeywordCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            KeywordCategory::Useful => "有益",
            KeywordCategory::Empathy => "共感",
        }
    }

    /// The post category a keyword drafts into.
    #[must_use]
    pub fn post_category(self) -> PostCategory {
        match self {
            KeywordCategory::Useful => PostCategory::Useful,
            KeywordCategory::Empathy => PostCategory::Empathy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordStatus {
    Unused,
    Used,
    Archived,
}

keyed_enum!(KeywordStatus, "keyword status", {
    Unused => "unused",
    Used => "used",
    Archived => "archived",
});

impl KeywordStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            KeywordStatus::Unused => "未使用",
            KeywordStatus::Used => "使用済み",
            KeywordStatus::Archived => "アーカイブ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookCategory {
    Urgent,
    Confession,
    Limited,
    Contrast,
    Question,
    Number,
    Other,
}

keyed_enum!(HookCategory, "hook category", {
    Urgent => "urgent",
    Confession => "confession",
    Limited => "limited",
    Contrast => "contrast",
    Question => "question",
    Number => "number",
    Other => "other",
});

impl HookCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            HookCategory::Urgent => "緊急・警告系",
            HookCategory::Confession => "告白・本音系",
            HookCategory::Limited => "限定・希少系",
            HookCategory::Contrast => "対比・比較系",
            HookCategory::Question => "疑問・問いかけ系",
            HookCategory::Number => "数字・具体性系",
            HookCategory::Other => "その他",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            HookCategory::Urgent => "#ef4444",
            HookCategory::Confession => "#8b5cf6",
            HookCategory::Limited => "#f59e0b",
            HookCategory::Contrast => "#10b981",
            HookCategory::Question => "#3b82f6",
            HookCategory::Number => "#ec4899",
            HookCategory::Other => "#6b7280",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Attention,
    Empathy,
    Value,
    Story,
    Other,
}

keyed_enum!(TemplateCategory, "template category", {
    Attention => "attention",
    Empathy => "empathy",
    Value => "value",
    Story => "story",
    Other => "other",
});

impl TemplateCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TemplateCategory::Attention => "注意喚起型",
            TemplateCategory::Empathy => "共感型",
            TemplateCategory::Value => "価値提供型",
            TemplateCategory::Story => "ストーリー型",
            TemplateCategory::Other => "その他",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            TemplateCategory::Attention => "#ef4444",
            TemplateCategory::Empathy => "#8b5cf6",
            TemplateCategory::Value => "#10b981",
            TemplateCategory::Story => "#f59e0b",
            TemplateCategory::Other => "#6b7280",
        }
    }
}

/// Grouping of brand-strategy sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyCategory {
    Concept,
    Who,
    Persona,
    What,
    How,
    Why,
}

keyed_enum!(StrategyCategory, "strategy category", {
    Concept => "concept",
    Who => "who",
    Persona => "persona",
    What => "what",
    How => "how",
    Why => "why",
});

impl StrategyCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StrategyCategory::Concept => "事業コンセプト",
            StrategyCategory::Who => "誰が（権威性・実績）",
            StrategyCategory::Persona => "誰に（ペルソナ）",
            StrategyCategory::What => "何を伝えるか",
            StrategyCategory::How => "どんな手段で",
            StrategyCategory::Why => "なぜやるのか",
        }
    }

    /// Writing guideline handed to the generator for sections in this group.
    #[must_use]
    pub fn guideline(self) -> &'static str {
        match self {
            StrategyCategory::Concept => {
                "事業コンセプトに関する内容を生成します。\n\
                 この人物のミッション・ビジョン・価値観を深掘りし、一貫性のある事業理念を表現してください。"
            }
            StrategyCategory::Who => {
                "権威性・実績に関する内容を生成します。\n\
                 この人物の専門性、実績、経歴を説得力のある形で表現してください。\n\
                 数字や具体的な成果を含めると効果的です。"
            }
            StrategyCategory::Persona => {
                "ターゲットペルソナに関する内容を生成します。\n\
                 ターゲット顧客の具体的な属性、心理状態、悩み、願望を詳細に描写してください。\n\
                 共感を呼ぶ具体的なシーンや言葉を含めてください。"
            }
            StrategyCategory::What => {
                "提供価値に関する内容を生成します。\n\
                 この人物が提供できる独自の価値、差別化ポイント、専門知識を明確に表現してください。\n\
                 ビフォーアフターを含めると説得力が増します。"
            }
            StrategyCategory::How => {
                "提供手段に関する内容を生成します。\n\
                 商品・サービスの具体的な内容、コンテンツ戦略、投稿方針を実践的に記述してください。"
            }
            StrategyCategory::Why => {
                "なぜやるのかに関する内容を生成します。\n\
                 この活動を始めた背景、情熱の源泉、今このタイミングで発信する理由を感情に訴える形で表現してください。"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for hook in HookCategory::ALL {
            assert_eq!(hook.as_str().parse::<HookCategory>().unwrap(), *hook);
        }
        for template in TemplateCategory::ALL {
            assert_eq!(
                template.as_str().parse::<TemplateCategory>().unwrap(),
                *template
            );
        }
    }

    #[test]
    fn unknown_key_is_rejected_with_kind() {
        let err = "viral".parse::<HookCategory>().unwrap_err();
        assert!(
            matches!(err, CoreError::UnknownVariant { kind: "hook category", ref value } if value == "viral")
        );
    }

    #[test]
    fn hook_colours_match_dashboard_palette() {
        assert_eq!(HookCategory::Urgent.color(), "#ef4444");
        assert_eq!(HookCategory::Question.color(), "#3b82f6");
        assert_eq!(HookCategory::Other.color(), "#6b7280");
    }

    #[test]
    fn labels_are_japanese_display_strings() {
        assert_eq!(PostCategory::Useful.label(), "有益");
        assert_eq!(PostCategory::Empathy.prompt_label(), "共感系");
        assert_eq!(IdeaStatus::Posted.label(), "投稿済み");
        assert_eq!(TemplateCategory::Value.label(), "価値提供型");
        assert_eq!(StrategyCategory::Persona.label(), "誰に（ペルソナ）");
    }

    #[test]
    fn serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&IdeaStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
        let parsed: KeywordStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(parsed, KeywordStatus::Archived);
    }

    #[test]
    fn keyword_category_maps_onto_post_category() {
        assert_eq!(
            KeywordCategory::Empathy.post_category(),
            PostCategory::Empathy
        );
    }
}
