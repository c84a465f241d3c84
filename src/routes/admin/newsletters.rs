use axum::Extension;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::authentication::Claims;
use crate::domain::{NewsletterDraft, NewsletterInput, resolve_published_at};
use crate::repositories::RepositoryError;
use crate::routes::constants::duplicate_slug_message;
use crate::routes::{ApiError, AppJson, DeleteResponse, NewsletterResponse};
use crate::startup::AppState;

fn not_found() -> ApiError {
    ApiError::NotFound("Newsletter not found".into())
}

/// The database constraint has the final word when two writes race past the pre-check.
fn map_slug_conflict(slug: &str) -> impl FnOnce(RepositoryError) -> ApiError + '_ {
    move |e| match e {
        RepositoryError::Duplicate(_) => ApiError::Duplicate(duplicate_slug_message(slug)),
        e => e.into(),
    }
}

async fn ensure_slug_is_free(
    state: &AppState,
    slug: &str,
    excluding: Option<Uuid>,
) -> Result<(), ApiError> {
    if state.newsletters.slug_taken(slug, excluding).await? {
        return Err(ApiError::Duplicate(duplicate_slug_message(slug)));
    }
    Ok(())
}

/// Admin: Get all newsletters
///
/// Returns drafts and published newsletters, most recently created first.
#[utoipa::path(
    get,
    path = "/api/admin/newsletters",
    tag = "admin-newsletters",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "List of all newsletters", body = Vec<NewsletterResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Admin: Get all newsletters", skip(state, _claims))]
pub async fn admin_list_newsletters(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<NewsletterResponse>>, ApiError> {
    let newsletters = state.newsletters.list_all().await?;
    Ok(Json(newsletters.into_iter().map(Into::into).collect()))
}

/// Admin: Get newsletter by ID
///
/// Returns a newsletter regardless of its status.
#[utoipa::path(
    get,
    path = "/api/admin/newsletters/{id}",
    tag = "admin-newsletters",
    security(("bearer_token" = [])),
    params(
        ("id" = Uuid, Path, description = "Newsletter unique identifier")
    ),
    responses(
        (status = 200, description = "Newsletter found", body = NewsletterResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Newsletter not found"),
    )
)]
#[tracing::instrument(name = "Admin: Get newsletter by id", skip(state, _claims))]
pub async fn admin_get_newsletter(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(newsletter_id): Path<Uuid>,
) -> Result<Json<NewsletterResponse>, ApiError> {
    let newsletter = state
        .newsletters
        .find_by_id(newsletter_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(newsletter.into()))
}

/// Admin: Create newsletter
///
/// Validates the body, rejects slugs already in use and stamps
/// `publishedAt` when the newsletter is created as published.
#[utoipa::path(
    post,
    path = "/api/admin/newsletters",
    tag = "admin-newsletters",
    security(("bearer_token" = [])),
    request_body = NewsletterInput,
    responses(
        (status = 201, description = "Newsletter created", body = NewsletterResponse),
        (status = 400, description = "Invalid body or slug already exists"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(
    name = "Admin: Create newsletter",
    skip(state, claims, input),
    fields(admin_id = %claims.sub, slug = %input.slug)
)]
pub async fn admin_create_newsletter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(input): AppJson<NewsletterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = NewsletterDraft::try_from(input).map_err(ApiError::Validation)?;
    ensure_slug_is_free(&state, draft.slug.as_ref(), None).await?;

    let published_at = resolve_published_at(draft.status, None, Utc::now());
    let newsletter = state
        .newsletters
        .insert(&draft, published_at)
        .await
        .map_err(map_slug_conflict(draft.slug.as_ref()))?;

    tracing::info!(newsletter_id = %newsletter.id, "Newsletter created");
    Ok((StatusCode::CREATED, Json(NewsletterResponse::from(newsletter))))
}

/// Admin: Replace newsletter
///
/// Full replace with the same validation as creation. The slug may stay
/// the same; it only has to be unique among the other newsletters.
#[utoipa::path(
    put,
    path = "/api/admin/newsletters/{id}",
    tag = "admin-newsletters",
    security(("bearer_token" = [])),
    params(
        ("id" = Uuid, Path, description = "Newsletter unique identifier")
    ),
    request_body = NewsletterInput,
    responses(
        (status = 200, description = "Newsletter updated", body = NewsletterResponse),
        (status = 400, description = "Invalid body or slug already exists"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Newsletter not found"),
    )
)]
#[tracing::instrument(
    name = "Admin: Update newsletter",
    skip(state, claims, input),
    fields(admin_id = %claims.sub)
)]
pub async fn admin_update_newsletter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(newsletter_id): Path<Uuid>,
    AppJson(input): AppJson<NewsletterInput>,
) -> Result<Json<NewsletterResponse>, ApiError> {
    let existing = state
        .newsletters
        .find_by_id(newsletter_id)
        .await?
        .ok_or_else(not_found)?;

    let draft = NewsletterDraft::try_from(input).map_err(ApiError::Validation)?;
    ensure_slug_is_free(&state, draft.slug.as_ref(), Some(newsletter_id)).await?;

    let published_at = resolve_published_at(draft.status, existing.published_at, Utc::now());
    let newsletter = state
        .newsletters
        .replace(newsletter_id, &draft, published_at)
        .await
        .map_err(map_slug_conflict(draft.slug.as_ref()))?
        .ok_or_else(not_found)?;

    Ok(Json(newsletter.into()))
}

/// Admin: Delete newsletter
#[utoipa::path(
    delete,
    path = "/api/admin/newsletters/{id}",
    tag = "admin-newsletters",
    security(("bearer_token" = [])),
    params(
        ("id" = Uuid, Path, description = "Newsletter unique identifier")
    ),
    responses(
        (status = 200, description = "Newsletter deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Newsletter not found"),
    )
)]
#[tracing::instrument(
    name = "Admin: Delete newsletter",
    skip(state, claims),
    fields(admin_id = %claims.sub)
)]
pub async fn admin_delete_newsletter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(newsletter_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.newsletters.delete(newsletter_id).await? {
        return Err(not_found());
    }
    Ok(Json(DeleteResponse::new(newsletter_id)))
}
