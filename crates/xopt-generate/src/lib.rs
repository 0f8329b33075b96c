//! Client for the generative text backend used to draft profiles, strategy
//! sections, keyword ideas and posts.
//!
//! Prompt assembly ([`prompt`]) and JSON extraction ([`parse`]) are pure and
//! tested on their own; [`GeneratorClient`] only adds transport and retry.

pub mod client;
pub mod error;
mod generate;
pub mod parse;
pub mod prompt;
pub(crate) mod retry;
pub mod types;

pub use client::{GeneratorClient, GeneratorConfig};
pub use error::GenerateError;
pub use generate::{
    KEYWORDS_MAX_TOKENS, POST_MAX_TOKENS, PROFILE_MAX_TOKENS, SECTION_MAX_TOKENS,
    STRUCTURED_POST_MAX_TOKENS,
};
pub use prompt::Brief;
pub use types::{
    GeneratedPost, GeneratedProfile, KeywordIdea, PostRequest, ReplyPost, StructureUsed,
    StructuredPost, StructuredPostRequest,
};
