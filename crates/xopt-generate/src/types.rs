//! Wire types for the Messages API and the typed results of each generator.
//!
//! Model replies are asked for camelCase JSON; result types accept those keys
//! through `alias` and serialize back out in snake case.

use serde::{Deserialize, Serialize};
use xopt_core::{KeywordCategory, PostCategory};

// ---- Messages API ----

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MessageRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<Message<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessageResponse {
    /// Text of the first block, if that block is text.
    pub(crate) fn first_text(&self) -> Option<&str> {
        match self.content.first()? {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

// ---- Requests ----

/// Inputs for a free-form post draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub category: Option<PostCategory>,
    #[serde(default)]
    pub tone: Option<String>,
    /// Existing idea titles offered as reference material.
    #[serde(default)]
    pub existing_ideas: Vec<String>,
}

/// Inputs for a post built from a hook and a structure template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPostRequest {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub category: Option<PostCategory>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

// ---- Results ----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProfile {
    #[serde(alias = "profileText")]
    pub profile_text: String,
    #[serde(alias = "headerCopy", default)]
    pub header_copy: String,
    #[serde(alias = "fixedTweet", default)]
    pub fixed_tweet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordIdea {
    pub theme: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: KeywordCategory,
    #[serde(default)]
    pub hooks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordBatch {
    #[serde(default)]
    pub keywords: Vec<KeywordIdea>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub content: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Recounted locally after parsing; the model's own count is not trusted.
    #[serde(alias = "characterCount", default)]
    pub character_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPost {
    pub content: String,
    #[serde(alias = "characterCount", default)]
    pub character_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureUsed {
    #[serde(alias = "templateName", default)]
    pub template_name: Option<String>,
    #[serde(alias = "hookUsed", default)]
    pub hook_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPost {
    pub content: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(alias = "characterCount", default)]
    pub character_count: i32,
    #[serde(alias = "replyThread", default)]
    pub reply_thread: Vec<ReplyPost>,
    #[serde(alias = "structureUsed", default)]
    pub structure_used: StructureUsed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_text_skips_non_text_leading_block() {
        let body: MessageResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "tool_use", "id": "x", "name": "n", "input": {}}]
        }))
        .expect("parse");
        assert_eq!(body.first_text(), None);

        let body: MessageResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "hello"}]
        }))
        .expect("parse");
        assert_eq!(body.first_text(), Some("hello"));
    }

    #[test]
    fn structured_post_accepts_camel_case_keys() {
        let post: StructuredPost = serde_json::from_value(serde_json::json!({
            "content": "本文",
            "title": "t",
            "tags": [],
            "characterCount": 2,
            "replyThread": [{"content": "続き", "characterCount": 2}],
            "structureUsed": {"templateName": "PREP", "hookUsed": "なし"}
        }))
        .expect("parse");
        assert_eq!(post.reply_thread.len(), 1);
        assert_eq!(post.structure_used.template_name.as_deref(), Some("PREP"));

        let out = serde_json::to_value(&post).expect("serialize");
        assert!(out.get("reply_thread").is_some());
        assert!(out.get("replyThread").is_none());
    }

    #[test]
    fn keyword_idea_rejects_unknown_category() {
        let result: Result<KeywordIdea, _> = serde_json::from_value(serde_json::json!({
            "theme": "朝活", "category": "gossip"
        }));
        assert!(result.is_err());
    }
}
