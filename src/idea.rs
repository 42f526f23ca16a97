use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::IdeaError;
use crate::types::{FieldDef, TypeDef};

/// Shortest idea text, after trimming, that is worth sending to the model.
pub const MIN_IDEA_CHARS: usize = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Genre {
    #[default]
    Any,
    #[serde(rename = "RPG")]
    #[strum(serialize = "RPG")]
    Rpg,
    Puzzle,
    Roguelike,
    Platformer,
    #[serde(rename = "Co-op")]
    #[strum(serialize = "Co-op")]
    Coop,
    Horror,
    Narrative,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Tone {
    #[default]
    Any,
    Cozy,
    Dark,
    Surreal,
    Comedic,
    Epic,
    Other,
}

impl Genre {
    /// Parse a UI/CLI selector. Blank means "no preference".
    pub fn from_selector(value: &str) -> Result<Self, IdeaError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Self::Any);
        }
        value.parse().map_err(|_| IdeaError::InvalidSelector {
            kind: "genre",
            value: value.to_string(),
        })
    }

    /// The selectable genres, without the unspecified placeholder.
    pub fn choices() -> impl Iterator<Item = Self> {
        Self::iter().filter(|g| *g != Self::Any)
    }
}

impl Tone {
    /// Parse a UI/CLI selector. Blank means "no preference".
    pub fn from_selector(value: &str) -> Result<Self, IdeaError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Self::Any);
        }
        value.parse().map_err(|_| IdeaError::InvalidSelector {
            kind: "tone",
            value: value.to_string(),
        })
    }

    pub fn choices() -> impl Iterator<Item = Self> {
        Self::iter().filter(|t| *t != Self::Any)
    }
}

/// One user action asking for an idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaRequest {
    pub idea_text: String,
    pub genre: Genre,
    pub tone: Tone,
}

impl IdeaRequest {
    pub fn new(idea_text: impl Into<String>, genre: Genre, tone: Tone) -> Self {
        Self {
            idea_text: idea_text.into(),
            genre,
            tone,
        }
    }

    /// Build a request from raw selector strings, as submitted by a form or the CLI.
    pub fn from_selectors(idea_text: &str, genre: &str, tone: &str) -> Result<Self, IdeaError> {
        Ok(Self::new(
            idea_text,
            Genre::from_selector(genre)?,
            Tone::from_selector(tone)?,
        ))
    }

    pub fn check_length(&self) -> Result<(), IdeaError> {
        let len = self.idea_text.trim().chars().count();
        if len < MIN_IDEA_CHARS {
            return Err(IdeaError::InputTooShort {
                len,
                min: MIN_IDEA_CHARS,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignerResponse {
    pub title: String,
    pub core_fantasy: String,
    pub core_loop: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mechanics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerResponse {
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub systems: Vec<String>,
    pub challenges: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistResponse {
    pub summary: String,
    pub imagery: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub references: Vec<String>,
    pub palette: String,
}

/// A generated idea. `genre` and `tone` always carry the requester's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaResult {
    pub prompt: String,
    pub genre: Genre,
    pub tone: Tone,
    pub designer: DesignerResponse,
    pub engineer: EngineerResponse,
    pub artist: ArtistResponse,
    pub created_at: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_list() -> TypeDef {
    TypeDef::List(Box::new(TypeDef::Text))
}

// TypeDef for the model's reply (the three perspectives only; the rest is ours).
pub fn idea_reply_typedef() -> TypeDef {
    TypeDef::Object(idea_reply_fields())
}

pub fn idea_reply_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::required(
            "designer",
            TypeDef::Object(vec![
                FieldDef::required("title", TypeDef::Text),
                FieldDef::required("coreFantasy", TypeDef::Text),
                FieldDef::required("coreLoop", TypeDef::Text),
                FieldDef::optional("mechanics", text_list()),
            ]),
        ),
        FieldDef::required(
            "engineer",
            TypeDef::Object(vec![
                FieldDef::required("summary", TypeDef::Text),
                FieldDef::optional("systems", text_list()),
                FieldDef::required("challenges", TypeDef::Text),
            ]),
        ),
        FieldDef::required(
            "artist",
            TypeDef::Object(vec![
                FieldDef::required("summary", TypeDef::Text),
                FieldDef::required("imagery", TypeDef::Text),
                FieldDef::optional("references", text_list()),
                FieldDef::required("palette", TypeDef::Text),
            ]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_are_case_insensitive_and_blank_means_any() {
        assert_eq!(Genre::from_selector("co-op").unwrap(), Genre::Coop);
        assert_eq!(Genre::from_selector("rpg").unwrap(), Genre::Rpg);
        assert_eq!(Genre::from_selector("  ").unwrap(), Genre::Any);
        assert_eq!(Tone::from_selector("").unwrap(), Tone::Any);
        assert_eq!(Tone::from_selector("EPIC").unwrap(), Tone::Epic);
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let err = Genre::from_selector("Comedy").unwrap_err();
        assert!(matches!(err, IdeaError::InvalidSelector { kind: "genre", ref value } if value == "Comedy"));
    }

    #[test]
    fn display_names_match_the_selector_labels() {
        let genres: Vec<String> = Genre::choices().map(|g| g.to_string()).collect();
        assert_eq!(
            genres,
            ["RPG", "Puzzle", "Roguelike", "Platformer", "Co-op", "Horror", "Narrative", "Other"]
        );
        assert_eq!(Tone::choices().count(), 6);
        assert_eq!(Genre::Any.to_string(), "Any");
    }

    #[test]
    fn serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&Genre::Coop).unwrap(), "\"Co-op\"");
        let tone: Tone = serde_json::from_str("\"Cozy\"").unwrap();
        assert_eq!(tone, Tone::Cozy);
    }

    #[test]
    fn length_check_counts_trimmed_characters() {
        let short = IdeaRequest::new("  abcd   ", Genre::Any, Tone::Any);
        assert!(matches!(
            short.check_length(),
            Err(IdeaError::InputTooShort { len: 4, min: 5 })
        ));
        // five multi-byte characters are enough
        assert!(IdeaRequest::new("ééééé", Genre::Any, Tone::Any).check_length().is_ok());
    }
}
