//! End-to-end workflow tests against a mocked proxy API.

use mailforge::backend::{ProxyBackend, RefinementKind};
use mailforge::draft::Phase;
use mailforge::engine::WorkflowEngine;
use mailforge::notify::{NotifyEvent, RecordingNotifier};
use mailforge::params::{EmailParameters, OutputFormat};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer) -> (WorkflowEngine, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let engine = WorkflowEngine::new(
        Box::new(ProxyBackend::new(&server.uri())),
        Box::new(notifier.clone()),
        EmailParameters::sample(),
    );
    (engine, notifier)
}

fn score_response() -> serde_json::Value {
    json!({
        "scores": {
            "subjectLine": 8,
            "writingStyle": 7,
            "content": 9,
            "structure": 6,
            "personalization": 5
        },
        "suggestions": "Mention the recipient's company in the first sentence."
    })
}

async fn mount_models(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "gemma"}, {"name": "qwen"}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_drafting_workflow() {
    let server = MockServer::start().await;
    mount_models(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .and(body_partial_json(json!({
            "tone": "professional",
            "length": "medium",
            "model": "gemma",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"generatedEmail": "Subject: Hello\n\nDear Jordan,"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/score-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(score_response()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refine-email"))
        .and(body_partial_json(json!({"refinementType": "improvement"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"refinedEmail": "Improved draft"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refine-email"))
        .and(body_partial_json(json!({"refinementType": "shorter"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"refinedEmail": "Short draft"})),
        )
        .mount(&server)
        .await;

    let (mut engine, _) = engine_for(&server);

    // Model list resolves the default selection.
    engine.load_models().await.unwrap();
    assert_eq!(engine.params().model.as_deref(), Some("gemma"));

    // Generate: draft populated, score card zeroed.
    engine.generate().await.unwrap();
    assert_eq!(engine.phase(), Phase::Ready);
    assert!(engine.draft().content.contains("Dear Jordan"));
    assert!(!engine.score_card().has_suggestions());

    // Score: five bounded numbers plus suggestions, phase Scored.
    engine.score().await.unwrap();
    assert_eq!(engine.phase(), Phase::Scored);
    let card = engine.score_card();
    for value in [
        card.subject_line,
        card.writing_style,
        card.content,
        card.structure,
        card.personalization,
    ] {
        assert!((0.0..=10.0).contains(&value));
    }
    assert!(card.has_suggestions());

    // Auto-improve: suggestions applied, presentation closed.
    engine.auto_improve().await.unwrap();
    assert_eq!(engine.phase(), Phase::Ready);
    assert_eq!(engine.draft().content, "Improved draft");

    // Named refinement still works afterwards.
    engine.refine(RefinementKind::Shorter).await.unwrap();
    assert_eq!(engine.draft().content, "Short draft");
}

#[tokio::test]
async fn improvement_request_carries_suggestions_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"generatedEmail": "Draft"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/score-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(score_response()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/refine-email"))
        .and(body_partial_json(json!({
            "refinementType": "improvement",
            "suggestions": "Mention the recipient's company in the first sentence.",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"refinedEmail": "Better"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut engine, _) = engine_for(&server);
    engine.generate().await.unwrap();
    engine.score().await.unwrap();
    engine.auto_improve().await.unwrap();
    assert_eq!(engine.draft().content, "Better");
}

#[tokio::test]
async fn html_scoring_converts_first_and_caches_the_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"generatedEmail": "<p>Hi</p>"})),
        )
        .mount(&server)
        .await;

    // Exactly one conversion across two score calls: the second is served
    // from the cache.
    Mock::given(method("POST"))
        .and(path("/api/convert-format"))
        .and(body_partial_json(json!({
            "content": "<p>Hi</p>",
            "fromFormat": "html",
            "toFormat": "markdown",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"convertedContent": "Hi"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/score-email"))
        .and(body_partial_json(json!({
            "emailContent": "Hi",
            "outputFormat": "markdown",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(score_response()))
        .expect(2)
        .mount(&server)
        .await;

    let (mut engine, _) = engine_for(&server);
    engine.params_mut().output_format = OutputFormat::Html;
    engine.generate().await.unwrap();

    engine.score().await.unwrap();
    engine.score().await.unwrap();
    assert_eq!(engine.phase(), Phase::Scored);
}

#[tokio::test]
async fn conversion_failure_scores_the_original_html() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"generatedEmail": "<p>Hi</p>"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/convert-format"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "converter offline"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/score-email"))
        .and(body_partial_json(json!({
            "emailContent": "<p>Hi</p>",
            "outputFormat": "html",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(score_response()))
        .expect(1)
        .mount(&server)
        .await;

    let (mut engine, _) = engine_for(&server);
    engine.params_mut().output_format = OutputFormat::Html;
    engine.generate().await.unwrap();

    // Scoring succeeds despite the failed conversion.
    engine.score().await.unwrap();
    assert_eq!(engine.phase(), Phase::Scored);
}

#[tokio::test]
async fn server_detail_reaches_the_user_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"detail": "temperature must be between 0 and 1"})),
        )
        .mount(&server)
        .await;

    let (mut engine, notifier) = engine_for(&server);
    let err = engine.generate().await.unwrap_err();
    assert!(err.to_string().contains("temperature must be between 0 and 1"));

    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("temperature must be between 0 and 1"));
    // The progress notice was still cleaned up.
    assert!(
        notifier
            .events()
            .iter()
            .any(|e| matches!(e, NotifyEvent::Dismiss(_)))
    );
}

#[tokio::test]
async fn partial_score_response_never_reaches_the_card() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"generatedEmail": "Draft"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/score-email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scores": {"subjectLine": 8, "writingStyle": 7},
            "suggestions": "…"
        })))
        .mount(&server)
        .await;

    let (mut engine, _) = engine_for(&server);
    engine.generate().await.unwrap();

    assert!(engine.score().await.is_err());
    assert_eq!(engine.phase(), Phase::Ready);
    assert!(!engine.score_card().has_suggestions());
}

#[tokio::test]
async fn failed_operations_are_retryable() {
    let server = MockServer::start().await;
    mount_models(&server).await;

    // First generate attempt fails, the retry succeeds.
    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"detail": "bad gateway"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate-email"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"generatedEmail": "Second try"})),
        )
        .mount(&server)
        .await;

    let (mut engine, _) = engine_for(&server);
    assert!(engine.generate().await.is_err());
    assert_eq!(engine.phase(), Phase::Idle);

    engine.generate().await.unwrap();
    assert_eq!(engine.draft().content, "Second try");
    assert_eq!(engine.phase(), Phase::Ready);
}
