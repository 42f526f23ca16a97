use serde::{Deserialize, Serialize};

use crate::idea::{idea_reply_fields, Genre, Tone};
use crate::types::{FieldDef, TypeDef};

/// System message sent alongside every instruction.
pub const SYSTEM_PROMPT: &str = "You are an AI that outputs ONLY valid JSON.\n\
You NEVER include commentary, markdown, or stray characters.\n\
You MUST include the exact genre and tone provided by the user.";

/// Which instruction template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Restatement, schema and JSON directive only.
    Compact,
    /// Adds the three-viewpoint brief and per-field quality guidance.
    #[default]
    Detailed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    style: PromptStyle,
}

impl PromptBuilder {
    pub fn new(style: PromptStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    /// Render the instruction for one idea. Pure: same inputs, same bytes.
    pub fn build(&self, idea_text: &str, genre: Genre, tone: Tone) -> String {
        let mut s = String::new();

        s.push_str(&format!("Game idea: {idea_text}\n"));
        s.push_str(&format!("Genre: {genre}\n"));
        s.push_str(&format!("Tone: {tone}\n\n"));

        if self.style == PromptStyle::Detailed {
            s.push_str(
                "Your task is to deeply elaborate on this idea from three professional viewpoints:\n\
                 - Game Designer\n\
                 - Gameplay Engineer\n\
                 - Concept Artist\n\n\
                 Write rich, multi-sentence paragraphs and avoid vague one-liners.\n\
                 Every field must contain meaningful detail, concrete examples, and imaginative specifics.\n\n",
            );
        }

        s.push_str("Respond ONLY with valid JSON in this exact format:\n\n");
        s.push_str(&describe_reply(genre, tone));
        s.push_str("\n\n");

        if self.style == PromptStyle::Detailed {
            s.push_str(
                "Instructions for quality:\n\
                 - \"coreFantasy\" should be 2-4 sentences with specific thematic and emotional framing.\n\
                 - \"coreLoop\" should be 2-3 sentences describing repeated player actions with clarity.\n\
                 - \"mechanics\" should include 3-6 detailed mechanic ideas.\n\
                 - Engineer sections must describe systems with purposeful reasoning and 2-4 sentence explanations.\n\
                 - Artist sections must describe atmosphere, tone, and visual direction with specificity.\n\
                 - Do not use placeholders like \"the player does X\"; be concrete.\n\n",
            );
        }

        s.push_str("The reply must be a single JSON object and nothing else.\n");
        s.push_str("Do not wrap it in markdown code fences and do not add prose before or after it.\n");

        s
    }
}

// JSON-like template of the reply, genre and tone pinned to the request.
fn describe_reply(genre: Genre, tone: Tone) -> String {
    let mut s = String::from("{\n");
    s.push_str(&format!("  \"genre\": \"{genre}\",\n"));
    s.push_str(&format!("  \"tone\": \"{tone}\",\n"));
    s.push_str(&describe_fields(&idea_reply_fields(), 0));
    s.push('}');
    s
}

fn describe_fields(fields: &[FieldDef], indent: usize) -> String {
    let pad = " ".repeat(indent);
    let mut s = String::new();
    for (idx, field) in fields.iter().enumerate() {
        let comma = if idx + 1 < fields.len() { "," } else { "" };
        s.push_str(&format!(
            "{pad}  \"{}\": {}{comma}\n",
            field.name,
            describe_schema(&field.ty, indent + 2)
        ));
    }
    s
}

// Inline type hint for one value: `string`, `string[]`, or a nested block.
fn describe_schema(ty: &TypeDef, indent: usize) -> String {
    match ty {
        TypeDef::Text => "string".to_string(),
        TypeDef::List(inner) => format!("{}[]", describe_schema(inner, indent)),
        TypeDef::Object(fields) => {
            let pad = " ".repeat(indent);
            format!("{{\n{}{pad}}}", describe_fields(fields, indent))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDEA: &str = "A co-op puzzle game about gravity";

    #[test]
    fn unspecified_selectors_render_as_any() {
        let prompt = PromptBuilder::default().build(IDEA, Genre::Any, Tone::Any);
        assert!(prompt.contains("Genre: Any"));
        assert!(prompt.contains("Tone: Any"));
        assert!(prompt.starts_with("Game idea: A co-op puzzle game about gravity\n"));
    }

    #[test]
    fn build_is_deterministic() {
        for style in [PromptStyle::Compact, PromptStyle::Detailed] {
            let builder = PromptBuilder::new(style);
            assert_eq!(
                builder.build(IDEA, Genre::Horror, Tone::Cozy),
                builder.build(IDEA, Genre::Horror, Tone::Cozy)
            );
        }
    }

    #[test]
    fn schema_lists_every_field_with_type_hints() {
        let prompt = PromptBuilder::new(PromptStyle::Compact).build(IDEA, Genre::Coop, Tone::Epic);
        let expected = r#"{
  "genre": "Co-op",
  "tone": "Epic",
  "designer": {
    "title": string,
    "coreFantasy": string,
    "coreLoop": string,
    "mechanics": string[]
  },
  "engineer": {
    "summary": string,
    "systems": string[],
    "challenges": string
  },
  "artist": {
    "summary": string,
    "imagery": string,
    "references": string[],
    "palette": string
  }
}"#;
        assert!(prompt.contains(expected), "schema block missing in:\n{prompt}");
    }

    #[test]
    fn directs_json_only_output() {
        let prompt = PromptBuilder::new(PromptStyle::Compact).build(IDEA, Genre::Any, Tone::Any);
        assert!(prompt.contains("Respond ONLY with valid JSON"));
        assert!(prompt.contains("Do not wrap it in markdown code fences"));
    }

    #[test]
    fn detailed_style_adds_quality_guidance() {
        let compact = PromptBuilder::new(PromptStyle::Compact).build(IDEA, Genre::Any, Tone::Any);
        let detailed = PromptBuilder::new(PromptStyle::Detailed).build(IDEA, Genre::Any, Tone::Any);
        assert!(!compact.contains("Instructions for quality"));
        assert!(detailed.contains("Instructions for quality"));
        assert!(detailed.contains("- Concept Artist"));
    }
}
