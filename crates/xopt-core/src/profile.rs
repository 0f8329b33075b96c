//! Profile design: persona, positioning inputs and generated copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Encoding version written by [`TargetPersona::to_stored`].
pub const PERSONA_VERSION: u64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPersona {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psychology: Option<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct StoredPersona {
    version: u64,
    persona: TargetPersona,
}

impl TargetPersona {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Wrap in the versioned envelope stored in the database.
    #[must_use]
    pub fn to_stored(&self) -> serde_json::Value {
        serde_json::json!({
            "version": PERSONA_VERSION,
            "persona": self,
        })
    }

    /// # Errors
    ///
    /// Returns `CoreError::UnsupportedPersonaVersion` for an unknown envelope
    /// version and `CoreError::PersonaDecode` for a malformed envelope.
    pub fn from_stored(value: serde_json::Value) -> Result<Self, CoreError> {
        let stored: StoredPersona = serde_json::from_value(value).map_err(CoreError::PersonaDecode)?;
        if stored.version != PERSONA_VERSION {
            return Err(CoreError::UnsupportedPersonaVersion(stored.version));
        }
        Ok(stored.persona)
    }

    /// One-line rendering for generation prompts.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        let labelled = [
            ("年齢層", &self.age_range),
            ("年収", &self.income_range),
            ("職業", &self.job_title),
            ("地域", &self.location),
            ("状況", &self.situation),
            ("心理", &self.psychology),
        ];
        for (label, value) in labelled {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                parts.push(format!("{label}: {v}"));
            }
        }
        if !self.pain_points.is_empty() {
            parts.push(format!("悩み: {}", self.pain_points.join("、")));
        }
        parts.join(" / ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDesign {
    pub id: Uuid,
    pub client_id: Uuid,
    pub target_persona: Option<TargetPersona>,
    pub what_to_deliver: Option<String>,
    pub future_promise: Option<String>,
    pub achievements: Option<String>,
    pub career_history: Option<String>,
    pub profile_text: Option<String>,
    pub header_copy: Option<String>,
    pub fixed_tweet: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a profile design; the unit of an upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDesignInput {
    #[serde(default)]
    pub target_persona: Option<TargetPersona>,
    #[serde(default)]
    pub what_to_deliver: Option<String>,
    #[serde(default)]
    pub future_promise: Option<String>,
    #[serde(default)]
    pub achievements: Option<String>,
    #[serde(default)]
    pub career_history: Option<String>,
    #[serde(default)]
    pub profile_text: Option<String>,
    #[serde(default)]
    pub header_copy: Option<String>,
    #[serde(default)]
    pub fixed_tweet: Option<String>,
}

impl From<&ProfileDesign> for ProfileDesignInput {
    fn from(design: &ProfileDesign) -> Self {
        Self {
            target_persona: design.target_persona.clone(),
            what_to_deliver: design.what_to_deliver.clone(),
            future_promise: design.future_promise.clone(),
            achievements: design.achievements.clone(),
            career_history: design.career_history.clone(),
            profile_text: design.profile_text.clone(),
            header_copy: design.header_copy.clone(),
            fixed_tweet: design.fixed_tweet.clone(),
        }
    }
}
