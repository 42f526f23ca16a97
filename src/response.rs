use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::IdeaError;
use crate::idea::{
    idea_reply_typedef, ArtistResponse, DesignerResponse, EngineerResponse, Genre, IdeaResult, Tone,
};
use crate::types::{validate as validate_shape, TypeDef};

// What we take from the model. genre/tone/prompt in the reply are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    designer: DesignerResponse,
    engineer: EngineerResponse,
    artist: ArtistResponse,
    #[serde(default)]
    created_at: Option<Value>,
}

/// Turns raw completion text into an [`IdeaResult`], or fails as a whole.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
    schema: TypeDef,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self {
            schema: idea_reply_typedef(),
        }
    }

    pub fn validate(
        &self,
        raw_text: &str,
        idea_text: &str,
        original_genre: Genre,
        original_tone: Tone,
    ) -> Result<IdeaResult, IdeaError> {
        self.validate_at(raw_text, idea_text, original_genre, original_tone, Utc::now())
    }

    /// Same as [`validate`](Self::validate) with an explicit clock.
    pub fn validate_at(
        &self,
        raw_text: &str,
        idea_text: &str,
        original_genre: Genre,
        original_tone: Tone,
        now: DateTime<Utc>,
    ) -> Result<IdeaResult, IdeaError> {
        let value: Value = serde_json::from_str(raw_text).map_err(|e| IdeaError::MalformedJson {
            message: e.to_string(),
            raw: raw_text.to_string(),
        })?;

        validate_shape(&self.schema, &value).map_err(|errors| IdeaError::SchemaMismatch {
            errors,
            raw: raw_text.to_string(),
        })?;

        // The structural check above covers every field serde needs, so this only
        // fails if the two definitions disagree.
        let reply: ModelReply =
            serde_json::from_value(value).map_err(|e| IdeaError::MalformedJson {
                message: e.to_string(),
                raw: raw_text.to_string(),
            })?;

        let created_at = reply
            .created_at
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(now);

        Ok(IdeaResult {
            prompt: idea_text.to_string(),
            genre: original_genre,
            tone: original_tone,
            designer: reply.designer,
            engineer: reply.engineer,
            artist: reply.artist,
            created_at,
        })
    }
}
