//! End-to-end tests for `POST /api/upload` and `GET /api/config`.

#![allow(clippy::indexing_slicing)]

use std::borrow::Cow;

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use rolla_integration_tests::{TestContext, TestOptions};
use rolla_server::config::FirebaseConfig;
use serde_json::{Value, json};

fn image(name: &str, bytes: impl Into<Cow<'static, [u8]>>) -> Part {
    Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str("image/png")
        .expect("valid mime")
}

async fn upload(ctx: &TestContext, form: Form) -> reqwest::Response {
    ctx.client
        .post(ctx.url("/api/upload"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to upload")
}

#[tokio::test]
async fn test_files_become_front_and_back() {
    let ctx = TestContext::spawn().await;
    let form = Form::new()
        .part("images", image("front.png", &b"front"[..]))
        .part("images", image("back.png", &b"back"[..]))
        .text("text", "Rolla")
        .text("text2", "Prints");

    let resp = upload(&ctx, form).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(
        body["message"],
        "Images uploaded and order stored successfully!"
    );
    let order = &body["order"];
    let front = order["imageUrl"].as_str().expect("front url");
    let back = order["imageUrl2"].as_str().expect("back url");
    assert!(front.starts_with("memory://objects/uploads/"));
    assert!(front.ends_with("-front.png"));
    assert!(back.ends_with("-back.png"));
    assert_eq!(order["text"], "Rolla");
    assert_eq!(order["text2"], "Prints");

    let objects = ctx.objects.objects().await;
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].bytes, b"front");
    assert_eq!(objects[1].bytes, b"back");

    let stored = ctx.designs.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(order["_id"], json!(stored[0].id));
}

#[tokio::test]
async fn test_base64_images_override_files() {
    let ctx = TestContext::spawn().await;
    let form = Form::new()
        .part("images", image("photo.png", &b"photo"[..]))
        .text("frontImage", "data:image/jpeg;base64,ZnJvbnQ=")
        .text("backImage", "data:image/png;base64,YmFjaw==");

    let resp = upload(&ctx, form).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Invalid JSON");
    let order = &body["order"];
    assert!(
        order["imageUrl"]
            .as_str()
            .expect("front url")
            .ends_with("-front_design.png")
    );
    assert!(
        order["imageUrl2"]
            .as_str()
            .expect("back url")
            .ends_with("-back_design.png")
    );
    assert_eq!(order["text"], "");

    let objects = ctx.objects.objects().await;
    assert_eq!(objects.len(), 3);
    assert_eq!(objects[1].content_type, "image/jpeg");
    assert_eq!(objects[1].bytes, b"front");
    assert_eq!(objects[2].bytes, b"back");
}

#[tokio::test]
async fn test_oversized_file_is_rejected() {
    let ctx = TestContext::spawn().await;
    let form = Form::new().part("images", image("huge.png", vec![0_u8; 5 * 1024 * 1024 + 1]));

    let resp = upload(&ctx, form).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["error"], "validation_error");
    assert!(ctx.objects.objects().await.is_empty());
    assert!(ctx.designs.all().await.is_empty());
}

#[tokio::test]
async fn test_client_config_exposes_firebase_values() {
    let ctx = TestContext::spawn_with(TestOptions {
        firebase: FirebaseConfig {
            api_key: Some("AIzaSyExample".to_string()),
            auth_domain: Some("rolla.firebaseapp.com".to_string()),
            ..FirebaseConfig::default()
        },
        ..TestOptions::default()
    })
    .await;

    let resp = ctx
        .client
        .get(ctx.url("/api/config"))
        .send()
        .await
        .expect("Failed to get config");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["apiKey"], "AIzaSyExample");
    assert_eq!(body["authDomain"], "rolla.firebaseapp.com");
    assert!(body["projectId"].is_null());
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::spawn().await;

    for path in ["/health", "/health/ready"] {
        let resp = ctx
            .client
            .get(ctx.url(path))
            .send()
            .await
            .expect("Failed to call health endpoint");
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}
