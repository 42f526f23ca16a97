mod common;

use common::{model_reply, pipeline_with, FakeCompletion};
use idea_studio::config::DEFAULT_TEMPERATURE;
use idea_studio::error::IdeaError;
use idea_studio::idea::{Genre, IdeaRequest, Tone};
use idea_studio::prompt::SYSTEM_PROMPT;

#[tokio::test]
async fn short_input_never_reaches_the_model() {
    let fake = FakeCompletion::replying(model_reply().to_string());
    let pipeline = pipeline_with(fake.clone());

    for text in ["", "    ", "abcd", "  ab  "] {
        let err = pipeline
            .generate(&IdeaRequest::new(text, Genre::Any, Tone::Any))
            .await
            .unwrap_err();
        assert!(matches!(err, IdeaError::InputTooShort { .. }), "{text:?} gave {err:?}");
    }
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn caller_selectors_override_model_echo() {
    let fake = FakeCompletion::replying(model_reply().to_string());
    let pipeline = pipeline_with(fake.clone());

    let idea = pipeline
        .generate(&IdeaRequest::new("A co-op puzzle game about gravity", Genre::Horror, Tone::Cozy))
        .await
        .unwrap();

    assert_eq!(idea.genre, Genre::Horror);
    assert_eq!(idea.tone, Tone::Cozy);
    assert_eq!(idea.prompt, "A co-op puzzle game about gravity");
    assert_eq!(idea.designer.mechanics, ["gravity wells", "shared tether"]);
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn sends_one_json_request_with_configured_sampling() {
    let fake = FakeCompletion::replying(model_reply().to_string());
    let pipeline = pipeline_with(fake.clone());

    pipeline
        .generate(&IdeaRequest::new("A co-op puzzle game about gravity", Genre::Any, Tone::Any))
        .await
        .unwrap();

    let sent = fake.last_request().unwrap();
    assert_eq!(sent.system, SYSTEM_PROMPT);
    assert!(sent.json_output);
    assert_eq!(sent.temperature, DEFAULT_TEMPERATURE);
    assert!(sent.instruction.contains("Genre: Any"));
    assert!(sent.instruction.contains("Tone: Any"));
}

#[tokio::test]
async fn non_json_reply_is_malformed() {
    let fake = FakeCompletion::replying("not json at all");
    let err = pipeline_with(fake.clone())
        .generate(&IdeaRequest::new("A stealth game in a library", Genre::Any, Tone::Dark))
        .await
        .unwrap_err();

    assert!(matches!(err, IdeaError::MalformedJson { .. }));
    assert_eq!(err.raw_text(), Some("not json at all"));
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn reply_without_artist_fails_as_a_whole() {
    let mut reply = model_reply();
    reply.as_object_mut().unwrap().remove("artist");
    let fake = FakeCompletion::replying(reply.to_string());

    let err = pipeline_with(fake)
        .generate(&IdeaRequest::new("A stealth game in a library", Genre::Any, Tone::Any))
        .await
        .unwrap_err();

    assert!(matches!(err, IdeaError::SchemaMismatch { .. }));
}

#[tokio::test]
async fn transport_failure_is_returned_not_retried() {
    let fake = FakeCompletion::failing("connection refused");
    let err = pipeline_with(fake.clone())
        .generate(&IdeaRequest::new("A stealth game in a library", Genre::Any, Tone::Any))
        .await
        .unwrap_err();

    assert!(matches!(err, IdeaError::TransportFailure(_)));
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn prompt_echo_keeps_the_text_as_given() {
    let fake = FakeCompletion::replying(model_reply().to_string());
    let idea = pipeline_with(fake.clone())
        .generate(&IdeaRequest::new("  A stealth game\n", Genre::Any, Tone::Any))
        .await
        .unwrap();

    assert_eq!(idea.prompt, "  A stealth game\n");
    let sent = fake.last_request().unwrap();
    assert!(sent.instruction.starts_with("Game idea:   A stealth game\n"));
}
