use art_machine::{
    api::{GenerateClient, GenerationApi},
    controller::{Controller, Phase, View, EMPTY_PROMPT_NOTICE},
    inference::{mock::MOCK_PNG_BASE64, MockInferenceClient},
    models::GenerationRequest,
    server::{self, ServerState, CONFIG_ERROR},
    styles::Style,
    Error,
};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tokio::net::TcpListener;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

async fn start_server(state: ServerState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve_on(listener, state));
    format!("http://{}/api/generate", addr)
}

async fn controller_for(inference: MockInferenceClient) -> Controller<GenerateClient> {
    let url = start_server(ServerState::new(Arc::new(inference))).await;
    Controller::new(GenerateClient::new(url))
}

#[tokio::test]
async fn test_full_workflow_through_proxy() {
    let inference = MockInferenceClient::new();
    let controller = controller_for(inference.clone()).await;
    let mut updates = controller.subscribe();

    controller.select_style("mural").unwrap();
    controller.set_prompt("  workers building a city  ");
    let phase = controller.submit().await.unwrap();
    assert_eq!(phase, Phase::Succeeded);

    // The proxy applied the mural modifier to the trimmed prompt.
    let expected = Style::find("mural")
        .unwrap()
        .enhance_prompt("workers building a city");
    assert_eq!(inference.get_prompts(), vec![expected]);

    let state = controller.state();
    assert!(!state.is_generating);
    assert!(state.current_error().is_none());
    let image = state.current_result().unwrap();
    assert_eq!(
        image.as_str(),
        format!("data:image/png;base64,{}", MOCK_PNG_BASE64)
    );
    assert!(updates.has_changed().unwrap());
    assert!(matches!(updates.borrow_and_update().view(), View::Result(_)));

    let dir = tempfile::tempdir().unwrap();
    let path = controller.export(dir.path()).unwrap().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("mexican-art-"));
    assert!(name.ends_with(".png"));
    assert_eq!(fs::read(&path).unwrap(), PNG_SIGNATURE);
}

#[tokio::test]
async fn test_list_and_wrapper_shapes_normalize_end_to_end() {
    let inference = MockInferenceClient::new()
        .with_image_response(json!(["AAAA", "BBBB"]))
        .with_image_response(json!({ "data": "data:image/jpeg;base64,/9j/4A==" }));
    let controller = controller_for(inference).await;

    controller.set_prompt("a cat");
    controller.submit().await.unwrap();
    assert_eq!(
        controller.state().current_result().unwrap().as_str(),
        "data:image/png;base64,AAAA"
    );

    controller.submit().await.unwrap();
    let state = controller.state();
    let image = state.current_result().unwrap();
    assert_eq!(image.media_type(), Some("image/jpeg"));

    let dir = tempfile::tempdir().unwrap();
    let path = controller.export(dir.path()).unwrap().unwrap();
    assert_eq!(path.extension().unwrap(), "jpg");
}

#[tokio::test]
async fn test_unrecognized_worker_output_lands_in_error_state() {
    let inference = MockInferenceClient::new().with_image_response(json!({ "seed": 42 }));
    let controller = controller_for(inference).await;

    controller.set_prompt("a cat");
    let phase = controller.submit().await.unwrap();
    assert_eq!(phase, Phase::Failed);

    let state = controller.state();
    assert!(state.current_result().is_none());
    assert!(state
        .current_error()
        .unwrap()
        .starts_with("Unexpected image format"));

    let dir = tempfile::tempdir().unwrap();
    assert!(controller.export(dir.path()).unwrap().is_none());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_inference_failure_message_reaches_view() {
    let inference = MockInferenceClient::new().with_failure("worker crashed".to_string());
    let controller = controller_for(inference).await;

    controller.set_prompt("a cat");
    assert_eq!(controller.submit().await.unwrap(), Phase::Failed);

    let state = controller.state();
    match state.view() {
        View::Error(message) => {
            assert!(message.starts_with("Error generating art:"));
            assert!(message.contains("worker crashed"));
        }
        other => panic!("expected error view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unconfigured_proxy_error_reaches_client() {
    let url = start_server(ServerState::unconfigured()).await;
    let client = GenerateClient::new(url);

    let err = client
        .generate(&GenerationRequest::new("a cat", "frida"))
        .await
        .unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, CONFIG_ERROR);
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_prompt_never_reaches_proxy() {
    let inference = MockInferenceClient::new();
    let controller = controller_for(inference.clone()).await;

    controller.set_prompt("   ");
    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, Error::Validation(ref notice) if notice == EMPTY_PROMPT_NOTICE));
    assert_eq!(controller.state().phase(), Phase::Idle);
    assert_eq!(inference.get_call_count(), 0);
}

#[tokio::test]
async fn test_new_submission_clears_previous_outcome() {
    let inference = MockInferenceClient::new()
        .with_image_response(json!({ "seed": 1 }))
        .with_image_response(json!("AAAA"));
    let controller = controller_for(inference).await;

    controller.set_prompt("a cat");
    controller.submit().await.unwrap();
    assert!(controller.state().current_error().is_some());

    controller.submit().await.unwrap();
    let state = controller.state();
    assert!(state.current_error().is_none());
    assert!(state.current_result().is_some());
}
