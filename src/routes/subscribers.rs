use axum::Extension;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authentication::Claims;
use crate::domain::{EmailAddress, Subscriber};
use crate::repositories::RepositoryError;
use crate::routes::constants::MESSAGE_SUBSCRIBED;
use crate::routes::{ApiError, AppJson, DeleteResponse};
use crate::startup::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberResponse {
    pub id: Uuid,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(subscriber: Subscriber) -> Self {
        SubscriberResponse {
            id: subscriber.id,
            email: subscriber.email,
            subscribed_at: subscriber.subscribed_at,
            is_active: subscriber.is_active,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    pub subscriber: SubscriberResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubscriberCountResponse {
    pub count: i64,
}

/// Subscribe an email address
#[utoipa::path(
    post,
    path = "/api/subscribers",
    tag = "subscribers",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubscribeResponse),
        (status = 400, description = "Invalid email address"),
        (status = 409, description = "Email is already subscribed"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(state, body),
    fields(subscriber_email = %body.email)
)]
pub async fn subscribe(
    State(state): State<AppState>,
    AppJson(body): AppJson<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = EmailAddress::parse(body.email).map_err(ApiError::Validation)?;

    if state.subscribers.find_by_email(&email).await?.is_some() {
        return Err(ApiError::AlreadySubscribed);
    }
    // Two concurrent requests can both pass the check above
    let subscriber = state
        .subscribers
        .insert(&email)
        .await
        .map_err(|e| match e {
            RepositoryError::Duplicate(_) => ApiError::AlreadySubscribed,
            e => e.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            success: true,
            message: MESSAGE_SUBSCRIBED.to_string(),
            subscriber: subscriber.into(),
        }),
    ))
}

/// Number of active subscribers
#[utoipa::path(
    get,
    path = "/api/subscribers/count",
    tag = "subscribers",
    responses(
        (status = 200, description = "Active subscriber count", body = SubscriberCountResponse),
    )
)]
#[tracing::instrument(name = "Count subscribers", skip(state))]
pub async fn subscriber_count(
    State(state): State<AppState>,
) -> Result<Json<SubscriberCountResponse>, ApiError> {
    let count = state.subscribers.count_active().await?;
    Ok(Json(SubscriberCountResponse { count }))
}

/// Admin: list subscribers, newest first
#[utoipa::path(
    get,
    path = "/api/subscribers",
    tag = "subscribers",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "All subscribers", body = Vec<SubscriberResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required"),
    )
)]
#[tracing::instrument(name = "Admin: Get subscribers", skip(state, _claims))]
pub async fn list_subscribers(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<SubscriberResponse>>, ApiError> {
    let subscribers = state.subscribers.list().await?;
    Ok(Json(subscribers.into_iter().map(Into::into).collect()))
}

/// Admin: remove a subscriber
#[utoipa::path(
    delete,
    path = "/api/subscribers/{id}",
    tag = "subscribers",
    security(("bearer_token" = [])),
    params(
        ("id" = Uuid, Path, description = "Subscriber unique identifier")
    ),
    responses(
        (status = 200, description = "Subscriber deleted", body = DeleteResponse),
        (status = 404, description = "Subscriber not found"),
    )
)]
#[tracing::instrument(name = "Admin: Delete subscriber", skip(state, claims), fields(admin_id = %claims.sub))]
pub async fn delete_subscriber(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(subscriber_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.subscribers.delete(subscriber_id).await? {
        return Err(ApiError::NotFound("Subscriber not found".into()));
    }
    Ok(Json(DeleteResponse::new(subscriber_id)))
}
