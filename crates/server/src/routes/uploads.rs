//! Design upload route handlers.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
};
use serde::Serialize;
use tracing::instrument;

use rolla_core::DesignOrder;

use crate::error::{AppError, Result};
use crate::services::{DesignUpload, UploadedFile};
use crate::state::AppState;

/// Confirmation message for a stored design order.
pub const UPLOAD_STORED_MESSAGE: &str = "Images uploaded and order stored successfully!";

/// File name used when a file part has none.
const FALLBACK_FILE_NAME: &str = "upload";

/// Body of a successful `POST /api/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub order: DesignOrder,
}

/// Store uploaded design images and record a design order.
///
/// Form fields: `images` (files), `frontImage` / `backImage` (base64 data
/// URLs), `text`, `text2`. Unknown fields are ignored.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let upload = read_design_upload(&mut multipart).await?;

    let order = state.uploads().submit(upload).await?;

    Ok(Json(UploadResponse {
        message: UPLOAD_STORED_MESSAGE,
        order,
    }))
}

/// Collect the form into a [`DesignUpload`].
async fn read_design_upload(multipart: &mut Multipart) -> Result<DesignUpload> {
    let mut upload = DesignUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => upload.files.push(read_file(field).await?),
            "frontImage" => upload.front_image = Some(field.text().await.map_err(malformed)?),
            "backImage" => upload.back_image = Some(field.text().await.map_err(malformed)?),
            "text" => upload.text = Some(field.text().await.map_err(malformed)?),
            "text2" => upload.text2 = Some(field.text().await.map_err(malformed)?),
            _ => tracing::debug!(field = %name, "Ignoring unknown upload field"),
        }
    }

    Ok(upload)
}

async fn read_file(field: Field<'_>) -> Result<UploadedFile> {
    let file_name = field
        .file_name()
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(malformed)?;

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn malformed(err: MultipartError) -> AppError {
    AppError::Validation(err.body_text())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use crate::test_support::{TestApp, read_json};

    const BOUNDARY: &str = "rolla-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_stores_images_and_order() {
        let app = TestApp::accepting();

        let response = app
            .router()
            .oneshot(multipart_request(&[
                Part::File("images", "front.png", b"front-bytes"),
                Part::File("images", "back.png", b"back-bytes"),
                Part::Text("text", "Hello"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = read_json(response).await;
        assert_eq!(
            body["message"],
            "Images uploaded and order stored successfully!"
        );
        let order = &body["order"];
        assert!(order["_id"].is_string());
        assert!(order["imageUrl"].as_str().unwrap().ends_with("-front.png"));
        assert!(order["imageUrl2"].as_str().unwrap().ends_with("-back.png"));
        assert_eq!(order["text"], "Hello");
        assert_eq!(order["text2"], "");

        let objects = app.objects.objects().await;
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].bytes, b"front-bytes");
        assert_eq!(objects[0].content_type, "image/png");
        assert_eq!(app.designs.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_base64_front_image() {
        let app = TestApp::accepting();

        let response = app
            .router()
            .oneshot(multipart_request(&[Part::Text(
                "frontImage",
                "data:image/png;base64,aGVsbG8=",
            )]))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = read_json(response).await;
        assert!(
            body["order"]["imageUrl"]
                .as_str()
                .unwrap()
                .ends_with("-front_design.png")
        );
        assert!(body["order"]["imageUrl2"].is_null());
        assert_eq!(app.objects.objects().await[0].bytes, b"hello");
    }

    #[tokio::test]
    async fn test_malformed_data_url_is_validation_error() {
        let app = TestApp::accepting();

        let response = app
            .router()
            .oneshot(multipart_request(&[Part::Text("backImage", "garbage")]))
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(read_json(response).await["error"], "validation_error");
        assert!(app.designs.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_validation_error() {
        let app = TestApp::accepting();

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(read_json(response).await["error"], "validation_error");
    }
}
