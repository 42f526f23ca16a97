use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, routing::post, Json, Router};
use idea_studio::logging::init_tracing;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    model: String,
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Clone)]
struct AppState {
    attempt_count: Arc<AtomicUsize>,
    fail_attempts: usize,
}

// Deliberately claims a genre/tone the caller never asked for.
const CANNED_IDEA: &str = r#"{
  "genre": "Comedy",
  "tone": "Epic",
  "designer": {
    "title": "Gravity Couriers",
    "coreFantasy": "You and a friend run a delivery service on a station whose gravity flips every few seconds. Every parcel is a small triumph over physics and each other.",
    "coreLoop": "Plan a route, time the gravity flips, hand parcels across gaps, and bank tips to upgrade your boots.",
    "mechanics": [
      "Shared gravity clock both players can nudge once per room",
      "Fragile parcels that break on hard landings",
      "Magnet boots that pin one player while the other swings"
    ]
  },
  "engineer": {
    "summary": "A deterministic 2D physics step with rollback netcode keeps both players' flips in sync.",
    "systems": [
      "Fixed-step rigid body solver with per-room gravity vectors",
      "Rollback networking with input delay of two frames",
      "Room graph generator seeded per delivery"
    ],
    "challenges": "Gravity flips change every contact at once, so the solver must settle stacks within one frame to avoid jitter across rollback."
  },
  "artist": {
    "summary": "Bright utilitarian sci-fi with hand-painted wear and cheerful signage.",
    "imagery": "Orange cargo pods drifting past porthole windows, scuffed boot prints on every wall.",
    "references": ["Outer Wilds", "Moving Out", "Lethal Company signage"],
    "palette": "safety orange, teal steel, off-white enamel"
  }
}"#;

async fn chat_completions(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<Value> {
    let attempt = state.attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
    let prompt_preview: String = req
        .messages
        .last()
        .map(|m| m.content.chars().take(120).collect())
        .unwrap_or_default();
    info!(attempt, model = %req.model, prompt = %prompt_preview, "mock completion request");

    let content = if attempt <= state.fail_attempts {
        info!("returning non-JSON reply");
        "Sure! Here is your game idea: a delivery game in space."
    } else {
        CANNED_IDEA
    };

    Json(json!({
        "id": format!("mock-{attempt}"),
        "object": "chat.completion",
        "model": req.model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(0);

    let port = std::env::var("MOCK_LLM_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8081);

    let fail_attempts = std::env::var("MOCK_LLM_FAIL_ATTEMPTS")
        .ok()
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);

    let state = AppState {
        attempt_count: Arc::new(AtomicUsize::new(0)),
        fail_attempts,
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("mock LLM server listening on http://{addr}");
    info!("first {fail_attempts} request(s) get a non-JSON reply");
    info!("point LLM_BASE_URL at http://{addr}/v1/chat/completions");

    axum::serve(listener, app).await?;
    Ok(())
}
