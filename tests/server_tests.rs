//! Router-level tests driven through tower's oneshot.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use image::{Rgb, RgbImage};
use tower::ServiceExt;

use edgeline_server::http::{create_router, ApiState};
use edgeline_store::{Mailbox, StoreLayout};
use edgeline_vision::SobelDetector;

const BOUNDARY: &str = "edgeline-test-boundary";

fn test_router(dir: &tempfile::TempDir) -> axum::Router {
    let layout = StoreLayout::open(dir.path()).unwrap();
    let mailbox = Arc::new(Mailbox::new(layout, Arc::new(SobelDetector::new()), false));
    create_router(ApiState {
        mailbox,
        max_upload_bytes: 8 * 1024 * 1024,
    })
}

fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
    });
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn multipart_request(uri: &str, filename: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn upload_then_gallery_then_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .clone()
        .oneshot(multipart_request("/images/raw", "shot.png", &encoded_png(32, 32)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["filename"], "shot.png");

    let response = router
        .clone()
        .oneshot(Request::get("/images/raw/gallery").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0]["filename"], "shot.png");
    assert_eq!(json[0]["path"], "/images/raw/shot.png");

    let response = router
        .oneshot(Request::get("/images/raw/shot.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
}

#[tokio::test]
async fn upload_rejects_empty_and_disallowed_files() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .clone()
        .oneshot(multipart_request("/images/raw", "empty.png", b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = router
        .oneshot(multipart_request("/images/raw", "script.sh", b"echo hi"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_store_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .clone()
        .oneshot(Request::get("/images/secret/gallery").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The exchange inbox is not reachable through the public image surface.
    let response = router
        .oneshot(
            Request::get("/images/exchange-inbox/gallery")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn exchange_deposit_consume_fetch_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    // Empty inbox first.
    let response = router
        .clone()
        .oneshot(Request::get("/exchange/inbound").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INBOX_EMPTY");

    // Headset posts a frame.
    let response = router
        .clone()
        .oneshot(multipart_request("/exchange/inbound", "frame.png", &encoded_png(64, 64)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Poll drains it into the processed store.
    let response = router
        .clone()
        .oneshot(Request::get("/exchange/inbound").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["filename"], "frame.png");
    assert_eq!(json["processed_path"], "/images/processed/frame.png");

    // Headset pulls the mask back by exact key.
    let response = router
        .clone()
        .oneshot(
            Request::get("/exchange/outbound?img=frame.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let mask = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(mask.dimensions(), (64, 64));

    // A second poll reprocesses the retained deposit instead of erroring.
    let response = router
        .oneshot(Request::get("/exchange/inbound").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn exchange_outbound_miss_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(
            Request::get("/exchange/outbound?img=missing.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn data_folder_is_reserved_and_empty() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    let response = router
        .oneshot(Request::get("/images/processed/data").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Data folder is currently empty.");
}

#[tokio::test]
async fn fetch_traversal_attempt_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(&dir);

    // Encoded traversal resolves to a sanitized name that simply misses.
    let response = router
        .oneshot(
            Request::get("/images/raw/..%2F..%2Fsecret.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
