#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use idea_studio::config::PipelineConfig;
use idea_studio::error::IdeaError;
use idea_studio::llm::{CompletionClient, CompletionRequest};
use idea_studio::pipeline::IdeaPipeline;
use serde_json::{json, Value};

/// Completion service double: replies with a fixed text and records calls.
pub struct FakeCompletion {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last: Mutex<Option<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, IdeaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        self.reply.clone().map_err(IdeaError::TransportFailure)
    }
}

pub fn pipeline_with(client: Arc<FakeCompletion>) -> IdeaPipeline {
    IdeaPipeline::new(client, &PipelineConfig::default())
}

pub fn model_reply() -> Value {
    json!({
        "genre": "Comedy",
        "tone": "Epic",
        "designer": {
            "title": "Orbit Lock",
            "coreFantasy": "Two engineers bend gravity to rescue a drifting station.",
            "coreLoop": "Scout, flip gravity, move crates, open the next bulkhead.",
            "mechanics": ["gravity wells", "shared tether"]
        },
        "engineer": {
            "summary": "Deterministic physics for co-op sync.",
            "systems": ["fixed-step solver", "rollback netcode"],
            "challenges": "Keeping stacked crates stable through flips."
        },
        "artist": {
            "summary": "Clean retro-futurism.",
            "imagery": "Crates floating past round windows.",
            "references": ["Portal 2"],
            "palette": "orange and teal"
        }
    })
}
