use axum::extract::{Path, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Newsletter, NewsletterStatus, NewsletterTemplate};
use crate::routes::ApiError;
use crate::startup::AppState;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterResponse {
    pub id: Uuid,
    pub title: String,
    /// URL-safe unique identifier
    pub slug: String,
    pub excerpt: String,
    /// Markdown or HTML body
    pub content: String,
    pub template: NewsletterTemplate,
    pub status: NewsletterStatus,
    pub cover_image: Option<String>,
    pub gallery: Vec<String>,
    /// Set the first time the newsletter was published
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Newsletter> for NewsletterResponse {
    fn from(newsletter: Newsletter) -> Self {
        NewsletterResponse {
            id: newsletter.id,
            title: newsletter.title,
            slug: newsletter.slug,
            excerpt: newsletter.excerpt,
            content: newsletter.content,
            template: newsletter.template,
            status: newsletter.status,
            cover_image: newsletter.cover_image,
            gallery: newsletter.gallery,
            published_at: newsletter.published_at,
            created_at: newsletter.created_at,
            updated_at: newsletter.updated_at,
        }
    }
}

/// Get all published newsletters
///
/// Newest publication first. No authentication required.
#[utoipa::path(
    get,
    path = "/api/newsletters",
    tag = "newsletters",
    responses(
        (status = 200, description = "List of published newsletters", body = Vec<NewsletterResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Get published newsletters", skip(state))]
pub async fn list_published_newsletters(
    State(state): State<AppState>,
) -> Result<Json<Vec<NewsletterResponse>>, ApiError> {
    let newsletters = state.newsletters.list_published().await?;
    Ok(Json(newsletters.into_iter().map(Into::into).collect()))
}

/// Get a published newsletter by slug
///
/// Drafts are reported as not found.
#[utoipa::path(
    get,
    path = "/api/newsletters/{slug}",
    tag = "newsletters",
    params(
        ("slug" = String, Path, description = "Newsletter slug")
    ),
    responses(
        (status = 200, description = "Newsletter found", body = NewsletterResponse),
        (status = 404, description = "Newsletter not found or not published"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(name = "Get newsletter by slug", skip(state))]
pub async fn get_newsletter_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<NewsletterResponse>, ApiError> {
    let newsletter = state
        .newsletters
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Newsletter not found".into()))?;

    Ok(Json(newsletter.into()))
}
