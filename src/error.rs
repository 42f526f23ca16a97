use thiserror::Error;

use crate::types::ValidationError;

/// Failures of a single generate round trip.
#[derive(Debug, Error)]
pub enum IdeaError {
    #[error("idea text is too short: {len} characters, need at least {min}")]
    InputTooShort { len: usize, min: usize },

    #[error("unknown {kind} '{value}'")]
    InvalidSelector { kind: &'static str, value: String },

    #[error("completion service failed: {0}")]
    TransportFailure(String),

    #[error("model returned invalid JSON: {message}")]
    MalformedJson { message: String, raw: String },

    #[error("model reply does not match the idea schema: {}", join_errors(.errors))]
    SchemaMismatch {
        errors: Vec<ValidationError>,
        raw: String,
    },
}

impl IdeaError {
    /// Message suitable for showing to the person who asked for the idea.
    pub fn user_message(&self) -> String {
        match self {
            IdeaError::InputTooShort { min, .. } => {
                format!("Prompt too short: describe your idea in at least {min} characters.")
            }
            IdeaError::InvalidSelector { kind, value } => {
                format!("'{value}' is not a known {kind}.")
            }
            IdeaError::TransportFailure(_) => {
                "The idea generator could not be reached. Please try again.".to_string()
            }
            IdeaError::MalformedJson { .. } => "Model returned invalid JSON.".to_string(),
            IdeaError::SchemaMismatch { .. } => {
                "Model returned an incomplete idea.".to_string()
            }
        }
    }

    /// The offending model reply, for the failures caused by model output.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            IdeaError::MalformedJson { raw, .. } | IdeaError::SchemaMismatch { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }

    /// Whether the caller can fix this by changing their input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            IdeaError::InputTooShort { .. } | IdeaError::InvalidSelector { .. }
        )
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GROQ_API_KEY is not set; it is required for the openai backend at {0}")]
    MissingApiKey(String),

    #[error("temperature {0} is outside 0.0..=2.0")]
    TemperatureOutOfRange(f32),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors from the saved-idea store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_lists_each_problem() {
        let err = IdeaError::SchemaMismatch {
            errors: vec![
                ValidationError::MissingField { path: "$.artist".into() },
                ValidationError::MissingField { path: "$.designer.title".into() },
            ],
            raw: "{}".into(),
        };
        assert_eq!(
            err.to_string(),
            "model reply does not match the idea schema: missing required field at $.artist; \
             missing required field at $.designer.title"
        );
        assert_eq!(err.raw_text(), Some("{}"));
    }

    #[test]
    fn only_input_problems_are_user_errors() {
        assert!(IdeaError::InputTooShort { len: 2, min: 5 }.is_user_error());
        assert!(!IdeaError::TransportFailure("down".into()).is_user_error());
        assert_eq!(IdeaError::TransportFailure("down".into()).raw_text(), None);
    }
}
