//! Post ideas and saved keyword suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::categories::{IdeaStatus, KeywordCategory, KeywordStatus, PostCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostIdea {
    pub id: Uuid,
    pub client_id: Uuid,
    pub category: PostCategory,
    pub title: Option<String>,
    pub content: String,
    pub character_count: i32,
    pub tags: Vec<String>,
    pub status: IdeaStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
    pub post_id: Option<String>,
    pub image_url: Option<String>,
    pub image_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSuggestion {
    pub id: Uuid,
    pub client_id: Uuid,
    pub theme: String,
    pub description: Option<String>,
    pub category: KeywordCategory,
    pub hooks: Vec<String>,
    pub status: KeywordStatus,
    pub used_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post length as X counts it for Japanese text: one per Unicode scalar value.
#[must_use]
pub fn character_count(content: &str) -> i32 {
    i32::try_from(content.chars().count()).unwrap_or(i32::MAX)
}

/// Split a comma-separated tag field, dropping blanks.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Narrowing applied to a client's idea list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdeaFilter {
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<PostCategory>,
    #[serde(default)]
    pub status: Option<IdeaStatus>,
}

impl IdeaFilter {
    #[must_use]
    pub fn matches(&self, idea: &PostIdea) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                idea.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&term))
                    || idea.content.to_lowercase().contains(&term)
            }
        };
        let matches_category = self.category.is_none_or(|c| c == idea.category);
        let matches_status = self.status.is_none_or(|s| s == idea.status);

        matches_search && matches_category && matches_status
    }

    #[must_use]
    pub fn apply(&self, ideas: Vec<PostIdea>) -> Vec<PostIdea> {
        ideas.into_iter().filter(|idea| self.matches(idea)).collect()
    }
}
