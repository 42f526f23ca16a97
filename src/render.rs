//! Plain-text rendering of an idea for terminals.

use std::fmt::Write;

use crate::history::SavedIdea;
use crate::idea::IdeaResult;

pub fn render_text(idea: &IdeaResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", idea.designer.title);
    let _ = writeln!(
        out,
        "Genre: {}  Tone: {}  ({})",
        idea.genre,
        idea.tone,
        idea.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "Prompt: {}", idea.prompt);

    heading(&mut out, "Game Designer");
    section(&mut out, "Core fantasy", &idea.designer.core_fantasy);
    section(&mut out, "Core loop", &idea.designer.core_loop);
    list(&mut out, "Mechanics", &idea.designer.mechanics);

    heading(&mut out, "Gameplay Engineer");
    section(&mut out, "Summary", &idea.engineer.summary);
    list(&mut out, "Systems", &idea.engineer.systems);
    section(&mut out, "Challenges", &idea.engineer.challenges);

    heading(&mut out, "Concept Artist");
    section(&mut out, "Mood and atmosphere", &idea.artist.summary);
    section(&mut out, "Key imagery", &idea.artist.imagery);
    list(&mut out, "Visual references", &idea.artist.references);
    section(&mut out, "Palette", &idea.artist.palette);

    out
}

/// One line per saved idea: id, date, title.
pub fn render_history_line(saved: &SavedIdea) -> String {
    format!(
        "{}  {}  {} [{} / {}]",
        saved.id,
        saved.idea.created_at.format("%Y-%m-%d"),
        saved.idea.designer.title,
        saved.idea.genre,
        saved.idea.tone
    )
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==");
}

fn section(out: &mut String, label: &str, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    let _ = writeln!(out, "{label}:\n  {}", text.trim());
}

fn list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{label}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}
