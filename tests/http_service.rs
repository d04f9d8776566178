use std::time::Duration;

use reelgrab::{
    ArtifactService, ArtifactType, ControllerOptions, HttpArtifactService, LifecycleController, ReelError,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REEL: &str = "https://www.instagram.com/reel/C8xYz12AbCd/";

fn controller_for(base_url: &str) -> LifecycleController {
    let service = HttpArtifactService::new(base_url, Duration::from_secs(5)).unwrap();
    LifecycleController::new(Box::new(service), ControllerOptions::default()).unwrap()
}

#[tokio::test]
async fn test_posts_json_url_and_reads_body() {
    let mock_server = MockServer::start().await;
    let body = vec![0x1au8; 4096];

    Mock::given(method("POST"))
        .and(path("/download/video"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "url": REEL })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(body.clone()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = HttpArtifactService::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let payload = service.fetch(ArtifactType::Video, REEL).await.unwrap();

    assert_eq!(payload.content_type.as_deref(), Some("video/mp4"));
    assert_eq!(payload.into_bytes().await.unwrap(), body);
}

#[tokio::test]
async fn test_non_success_status_fails() {
    let mock_server = MockServer::start().await;

    for status in [400u16, 404, 500, 502] {
        Mock::given(method("POST"))
            .and(path("/download/audio"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        let service = HttpArtifactService::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
        assert_err!(service.fetch(ArtifactType::Audio, REEL).await);
    }
}

#[tokio::test]
async fn test_controller_success_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/download/subtitles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello from the reel"))
        .mount(&mock_server)
        .await;

    let controller = controller_for(&mock_server.uri());
    controller.set_input(REEL);
    let result = assert_ok!(controller.submit(ArtifactType::Subtitles).await);

    assert_eq!(result.extension, ".txt");
    assert_eq!(result.read_text().unwrap(), "hello from the reel");

    let state = controller.snapshot();
    assert!(!state.loading);
    assert!(state.input.is_empty());
}

#[tokio::test]
async fn test_controller_streams_large_body_to_disk() {
    let mock_server = MockServer::start().await;
    let body: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

    Mock::given(method("POST"))
        .and(path("/download/video"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(body.clone()),
        )
        .mount(&mock_server)
        .await;

    let controller = controller_for(&mock_server.uri());
    controller.set_input(REEL);
    let result = assert_ok!(controller.submit(ArtifactType::Video).await);

    assert_eq!(result.size(), body.len() as u64);
    assert_eq!(result.content_type.as_deref(), Some("video/mp4"));
    assert_eq!(std::fs::read(result.path()).unwrap(), body);
}

#[tokio::test]
async fn test_controller_server_error_is_generic() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/download/video"))
        .respond_with(ResponseTemplate::new(500).set_body_string("yt-dlp exploded"))
        .mount(&mock_server)
        .await;

    let controller = controller_for(&mock_server.uri());
    controller.set_input(REEL);
    let err = controller.submit(ArtifactType::Video).await.unwrap_err();

    assert_eq!(err, ReelError::Request);
    let state = controller.snapshot();
    assert_eq!(state.error.as_deref(), Some("Link not valid or server error."));
    assert!(state.result.is_none());
    assert!(!state.loading);
    assert!(state.input.is_empty());
}

#[tokio::test]
async fn test_controller_unreachable_backend_is_generic() {
    // Nothing listens on the discard port
    let controller = controller_for("http://127.0.0.1:9");
    controller.set_input(REEL);
    let err = controller.submit(ArtifactType::Audio).await.unwrap_err();

    assert_eq!(err, ReelError::Request);
    assert_eq!(
        controller.snapshot().error.as_deref(),
        Some("Link not valid or server error.")
    );
}

#[tokio::test]
async fn test_empty_input_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let controller = controller_for(&mock_server.uri());
    controller.set_input("  ");
    assert_eq!(
        controller.submit(ArtifactType::Video).await.unwrap_err(),
        ReelError::Validation
    );
}
