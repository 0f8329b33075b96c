//! Extraction of the JSON payload from a model reply.
//!
//! Replies sometimes wrap the object in prose or code fences, so the widest
//! `{ ... }` span is taken and decoded.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::GenerateError;

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Returns the span from the first `{` to the last `}`, if any.
#[must_use]
pub fn json_span(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

/// Decodes the JSON object embedded in `text`.
///
/// # Errors
///
/// - [`GenerateError::MissingJson`] if no `{ ... }` span exists.
/// - [`GenerateError::Deserialize`] if the span is not a valid `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str, context: &str) -> Result<T, GenerateError> {
    let span = json_span(text).ok_or_else(|| GenerateError::MissingJson {
        context: context.to_string(),
    })?;
    serde_json::from_str(span).map_err(|source| GenerateError::Deserialize {
        context: context.to_string(),
        source,
    })
}
