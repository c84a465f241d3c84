use crate::test_app::spawn_app;

#[tokio::test]
async fn health_check_works() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get("/health_check", None).await;

    // Assert
    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn openapi_document_is_served_as_json() {
    let app = spawn_app().await;

    let response = app.get("/api-docs/openapi.json", None).await;

    assert_eq!(response.status().as_u16(), 200);
    let doc: serde_json::Value = response.json().await.unwrap();
    assert!(doc["paths"]["/api/admin/newsletters"].is_object());
}
