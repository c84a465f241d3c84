use reqwest::multipart::{Form, Part};
use wiremock::matchers::{any, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use newsletter_platform::routes::constants::MAX_UPLOAD_BYTES;

use crate::helpers::{assert_json_error, error_message};
use crate::test_app::spawn_app;

fn image_form() -> Form {
    let part = Part::bytes(b"\x89PNG\r\n\x1a\nfake-image".to_vec())
        .file_name("cover.png")
        .mime_str("image/png")
        .unwrap();
    Form::new().part("file", part)
}

fn upload_success() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "secure_url": "https://res.cloudinary.com/newsletter-platform/image/upload/v1712/newsletters/cover.png",
        "public_id": "newsletters/cover",
    }))
}

#[tokio::test]
async fn admins_can_upload_an_image() {
    // Arrange
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/newsletter-platform/image/upload"))
        .respond_with(upload_success())
        .expect(1)
        .mount(&app.image_server)
        .await;

    // Act
    let response = app.post_upload(image_form(), Some(&admin.token)).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["publicId"], "newsletters/cover");
    assert!(body["url"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn uploading_requires_an_admin() {
    let app = spawn_app().await;
    let reader = app.reader().await;

    assert_json_error(app.post_upload(image_form(), None).await, 401).await;
    assert_json_error(app.post_upload(image_form(), Some(&reader.token)).await, 403).await;
}

#[tokio::test]
async fn non_image_files_are_rejected_without_calling_the_host() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(any())
        .respond_with(upload_success())
        .expect(0)
        .mount(&app.image_server)
        .await;
    let part = Part::bytes(b"plain text".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();

    let response = app
        .post_upload(Form::new().part("file", part), Some(&admin.token))
        .await;

    assert_json_error(response, 400).await;
}

#[tokio::test]
async fn a_form_without_a_file_is_rejected() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    let response = app
        .post_upload(Form::new().text("caption", "hello"), Some(&admin.token))
        .await;

    let body = assert_json_error(response, 400).await;
    assert_eq!(error_message(&body), "No file provided");
}

#[tokio::test]
async fn files_over_the_upload_limit_are_rejected_with_413() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(any())
        .respond_with(upload_success())
        .expect(0)
        .mount(&app.image_server)
        .await;
    let part = Part::bytes(vec![0u8; MAX_UPLOAD_BYTES + 1024 * 1024])
        .file_name("huge.png")
        .mime_str("image/png")
        .unwrap();

    let response = app
        .post_upload(Form::new().part("file", part), Some(&admin.token))
        .await;

    assert_json_error(response, 413).await;
}

#[tokio::test]
async fn a_failing_host_is_retried_three_times_then_reported_as_502() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&app.image_server)
        .await;

    let response = app.post_upload(image_form(), Some(&admin.token)).await;

    assert_json_error(response, 502).await;
}

#[tokio::test]
async fn host_rejections_are_reported_with_the_host_message() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "message": "Invalid image file" }
        })))
        .expect(1)
        .mount(&app.image_server)
        .await;

    let response = app.post_upload(image_form(), Some(&admin.token)).await;

    let body = assert_json_error(response, 502).await;
    assert!(error_message(&body).contains("Invalid image file"));
}

#[tokio::test]
async fn images_can_be_deleted_by_public_id() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/newsletter-platform/image/destroy"))
        .and(body_string_contains("newsletters/cover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "ok"})))
        .expect(1)
        .mount(&app.image_server)
        .await;

    let response = app
        .delete_json(
            "/api/cloudinary-upload",
            &serde_json::json!({"publicId": "newsletters/cover"}),
            Some(&admin.token),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["publicId"], "newsletters/cover");
}

#[tokio::test]
async fn images_can_be_deleted_by_delivery_url() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(method("POST"))
        .and(path("/v1_1/newsletter-platform/image/destroy"))
        .and(body_string_contains("newsletters/cover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "ok"})))
        .expect(1)
        .mount(&app.image_server)
        .await;

    let response = app
        .delete_json(
            "/api/cloudinary-upload",
            &serde_json::json!({
                "url": "https://res.cloudinary.com/newsletter-platform/image/upload/v1712/newsletters/cover.png"
            }),
            Some(&admin.token),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn deleting_an_unknown_image_returns_404() {
    let app = spawn_app().await;
    let admin = app.admin().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "not found"})),
        )
        .expect(1)
        .mount(&app.image_server)
        .await;

    let response = app
        .delete_json(
            "/api/cloudinary-upload",
            &serde_json::json!({"publicId": "newsletters/missing"}),
            Some(&admin.token),
        )
        .await;

    assert_json_error(response, 404).await;
}

#[tokio::test]
async fn deleting_without_an_identifier_returns_400() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    let response = app
        .delete_json(
            "/api/cloudinary-upload",
            &serde_json::json!({"url": "https://example.com/no-upload-segment.png"}),
            Some(&admin.token),
        )
        .await;

    assert_json_error(response, 400).await;
}
