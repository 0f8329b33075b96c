//! One method per generator: build the prompt, call the model, decode the reply.

use xopt_core::{character_count, PostHook, PostTemplate, ProfileDesignInput, StrategySection};

use crate::client::GeneratorClient;
use crate::error::GenerateError;
use crate::parse::extract_json;
use crate::prompt::{
    keywords_prompt, post_prompt, profile_prompt, strategy_section_prompt, structured_post_prompt,
    Brief,
};
use crate::types::{
    GeneratedPost, GeneratedProfile, KeywordBatch, KeywordIdea, PostRequest, StructuredPost,
    StructuredPostRequest,
};

pub const PROFILE_MAX_TOKENS: u32 = 1024;
pub const SECTION_MAX_TOKENS: u32 = 1024;
pub const KEYWORDS_MAX_TOKENS: u32 = 4096;
pub const POST_MAX_TOKENS: u32 = 1024;
pub const STRUCTURED_POST_MAX_TOKENS: u32 = 2048;

impl GeneratorClient {
    /// Drafts a profile text, header copy and pinned post.
    ///
    /// # Errors
    ///
    /// Any [`GenerateError`] from the request or from decoding the reply.
    pub async fn generate_profile(
        &self,
        profile: &ProfileDesignInput,
    ) -> Result<GeneratedProfile, GenerateError> {
        let reply = self
            .complete(&profile_prompt(profile), PROFILE_MAX_TOKENS)
            .await?;
        extract_json(&reply, "profile")
    }

    /// Drafts the text of one strategy section.
    ///
    /// # Errors
    ///
    /// Any [`GenerateError`] from the request.
    pub async fn generate_strategy_section(
        &self,
        section: StrategySection,
        brief: Brief<'_>,
    ) -> Result<String, GenerateError> {
        let reply = self
            .complete(&strategy_section_prompt(section, brief), SECTION_MAX_TOKENS)
            .await?;
        Ok(reply.trim().to_string())
    }

    /// Drafts keyword ideas, skipping anything listed in `existing`.
    ///
    /// # Errors
    ///
    /// Any [`GenerateError`] from the request or from decoding the reply.
    pub async fn generate_keywords(
        &self,
        brief: Brief<'_>,
        existing: &[String],
    ) -> Result<Vec<KeywordIdea>, GenerateError> {
        let reply = self
            .complete(&keywords_prompt(brief, existing), KEYWORDS_MAX_TOKENS)
            .await?;
        let batch: KeywordBatch = extract_json(&reply, "keywords")?;
        let ideas: Vec<KeywordIdea> = batch
            .keywords
            .into_iter()
            .filter(|idea| !idea.theme.trim().is_empty())
            .filter(|idea| !existing.iter().any(|e| e == &idea.theme))
            .collect();
        tracing::info!(count = ideas.len(), "generated keyword ideas");
        Ok(ideas)
    }

    /// Drafts a single post.
    ///
    /// # Errors
    ///
    /// Any [`GenerateError`] from the request or from decoding the reply.
    pub async fn generate_post(
        &self,
        request: &PostRequest,
        brief: Brief<'_>,
    ) -> Result<GeneratedPost, GenerateError> {
        let reply = self
            .complete(&post_prompt(request, brief), POST_MAX_TOKENS)
            .await?;
        let mut post: GeneratedPost = extract_json(&reply, "post")?;
        post.character_count = character_count(&post.content);
        Ok(post)
    }

    /// Drafts a post that opens with `hook` and follows `template`.
    ///
    /// # Errors
    ///
    /// Any [`GenerateError`] from the request or from decoding the reply.
    pub async fn generate_structured_post(
        &self,
        request: &StructuredPostRequest,
        brief: Brief<'_>,
        hook: Option<&PostHook>,
        template: Option<&PostTemplate>,
    ) -> Result<StructuredPost, GenerateError> {
        let prompt = structured_post_prompt(request, brief, hook, template);
        let reply = self.complete(&prompt, STRUCTURED_POST_MAX_TOKENS).await?;
        let mut post: StructuredPost = extract_json(&reply, "structured post")?;
        post.character_count = character_count(&post.content);
        for reply_post in &mut post.reply_thread {
            reply_post.character_count = character_count(&reply_post.content);
        }
        post.structure_used.template_name = template.map(|t| t.name.clone());
        post.structure_used.hook_used = hook.map(|h| h.hook_text.clone());
        Ok(post)
    }
}
