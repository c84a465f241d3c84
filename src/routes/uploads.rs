use axum::Extension;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::authentication::Claims;
use crate::image_host::{ImageHostError, public_id_from_url};
use crate::routes::{ApiError, AppJson};
use crate::startup::AppState;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// HTTPS delivery URL
    pub url: String,
    pub public_id: String,
}

/// Multipart body of an upload. Only documents the form.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    pub public_id: Option<String>,
    /// Delivery URL, used when no public id is given
    pub url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageResponse {
    pub success: bool,
    pub public_id: String,
}

/// Admin: Upload an image
///
/// Expects a multipart body with a single `file` part holding an image.
#[utoipa::path(
    post,
    path = "/api/cloudinary-upload",
    tag = "uploads",
    security(("bearer_token" = [])),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image uploaded", body = UploadResponse),
        (status = 400, description = "Missing or non-image file"),
        (status = 413, description = "File larger than the upload limit"),
        (status = 502, description = "Image host failure"),
    )
)]
#[tracing::instrument(
    name = "Admin: Upload image",
    skip(state, claims, multipart),
    fields(admin_id = %claims.sub)
)]
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .filter(|mime| mime.starts_with("image/"))
            .ok_or_else(|| ApiError::Validation("Only image files can be uploaded".into()))?
            .to_owned();
        let filename = field.file_name().unwrap_or("upload").to_owned();
        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(ApiError::Validation("The uploaded file is empty".into()));
        }

        let image = state
            .image_host
            .upload(data.to_vec(), &filename, &content_type)
            .await
            .map_err(|e| ApiError::Upstream(e.into_inner().to_string()))?;

        return Ok(Json(UploadResponse {
            success: true,
            url: image.url,
            public_id: image.public_id,
        }));
    }

    Err(ApiError::Validation("No file provided".into()))
}

/// Admin: Delete an uploaded image
///
/// The image is identified by `publicId`, or by the public id embedded in `url`.
#[utoipa::path(
    delete,
    path = "/api/cloudinary-upload",
    tag = "uploads",
    security(("bearer_token" = [])),
    request_body = DeleteImageRequest,
    responses(
        (status = 200, description = "Image deleted", body = DeleteImageResponse),
        (status = 400, description = "No usable identifier"),
        (status = 404, description = "Image not found on the host"),
        (status = 502, description = "Image host failure"),
    )
)]
#[tracing::instrument(
    name = "Admin: Delete image",
    skip(state, claims, body),
    fields(admin_id = %claims.sub)
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(body): AppJson<DeleteImageRequest>,
) -> Result<Json<DeleteImageResponse>, ApiError> {
    let public_id = body
        .public_id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| body.url.as_deref().and_then(public_id_from_url))
        .ok_or_else(|| {
            ApiError::Validation("A publicId or an image url is required".into())
        })?;

    state
        .image_host
        .destroy(&public_id)
        .await
        .map_err(|e| match e.into_inner() {
            ImageHostError::NotFound(id) => ApiError::NotFound(format!("Image '{}' not found", id)),
            other => ApiError::Upstream(other.to_string()),
        })?;

    Ok(Json(DeleteImageResponse {
        success: true,
        public_id,
    }))
}
