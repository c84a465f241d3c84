use axum::Extension;
use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::authentication::Claims;
use crate::domain::{EmailAddress, UserName, UserRole, UserUpdate};
use crate::repositories::RepositoryError;
use crate::routes::constants::ERROR_USER_EXISTS;
use crate::routes::{ApiError, AppJson, DeleteResponse, UserResponse};
use crate::startup::AppState;

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".into())
}

/// Full replacement of a user's editable fields.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: UserRole,
}

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = String;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(UserUpdate {
            name: UserName::parse(value.name)?,
            email: EmailAddress::parse(value.email)?,
            role: value.role,
        })
    }
}

/// Admin: Get all users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin-users",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin access required"),
    )
)]
#[tracing::instrument(name = "Admin: Get all users", skip(state, _claims))]
pub async fn admin_list_users(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Admin: Get user by ID
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "admin-users",
    security(("bearer_token" = [])),
    params(
        ("id" = Uuid, Path, description = "User unique identifier")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(name = "Admin: Get user by id", skip(state, _claims))]
pub async fn admin_get_user(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(not_found)?;
    Ok(Json(user.into()))
}

/// Admin: Replace user
///
/// Name, email and role are all replaced. Passwords are not editable here.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "admin-users",
    security(("bearer_token" = [])),
    params(
        ("id" = Uuid, Path, description = "User unique identifier")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input or email already in use"),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(
    name = "Admin: Update user",
    skip(state, claims, body),
    fields(admin_id = %claims.sub)
)]
pub async fn admin_update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    AppJson(body): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let update = UserUpdate::try_from(body).map_err(ApiError::Validation)?;
    let user = state
        .users
        .update(user_id, &update)
        .await
        .map_err(|e| match e {
            RepositoryError::Duplicate(_) => ApiError::Duplicate(ERROR_USER_EXISTS.to_string()),
            e => e.into(),
        })?
        .ok_or_else(not_found)?;

    Ok(Json(user.into()))
}

/// Admin: Delete user
///
/// Admins cannot delete their own account.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin-users",
    security(("bearer_token" = [])),
    params(
        ("id" = Uuid, Path, description = "User unique identifier")
    ),
    responses(
        (status = 200, description = "User deleted", body = DeleteResponse),
        (status = 400, description = "Attempt to delete own account"),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(
    name = "Admin: Delete user",
    skip(state, claims),
    fields(admin_id = %claims.sub)
)]
pub async fn admin_delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if claims.sub == user_id {
        return Err(ApiError::Validation(
            "You cannot delete your own account".into(),
        ));
    }
    if !state.users.delete(user_id).await? {
        return Err(not_found());
    }
    Ok(Json(DeleteResponse::new(user_id)))
}
