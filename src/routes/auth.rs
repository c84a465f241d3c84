use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authentication::{
    AuthError, AuthenticatedUser, Credentials, hash_password, validate_credentials,
    validate_password_length,
};
use crate::domain::{EmailAddress, NewUser, User, UserName, UserRole};
use crate::repositories::RepositoryError;
use crate::routes::constants::ERROR_USER_EXISTS;
use crate::routes::{ApiError, AppJson};
use crate::startup::AppState;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Between 8 and 128 characters
    #[schema(value_type = String, format = Password)]
    pub password: Secret<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SignInRequest {
    pub email: String,
    #[schema(value_type = String, format = Password)]
    pub password: Secret<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub role: UserRole,
    pub user: UserResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: UserResponse,
}

fn auth_response(state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let token = state
        .tokens
        .issue(&user)
        .map_err(|e| ApiError::UnexpectedError(anyhow::Error::new(e)))?;
    Ok(AuthResponse {
        success: true,
        token,
        role: user.role,
        user: user.into(),
    })
}

/// Create a reader account
///
/// Public sign-up never grants the admin role.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(
    name = "Sign up",
    skip(state, body),
    fields(user_email = %body.email)
)]
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = UserName::parse(body.name).map_err(ApiError::Validation)?;
    let email = EmailAddress::parse(body.email).map_err(ApiError::Validation)?;
    validate_password_length(&body.password).map_err(|e| ApiError::Validation(e.to_string()))?;

    let new_user = NewUser {
        name,
        email,
        role: UserRole::Reader,
    };
    let password_hash = hash_password(body.password).await?;
    let user = state
        .users
        .insert(&new_user, password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Duplicate(_) => ApiError::Duplicate(ERROR_USER_EXISTS.to_string()),
            e => e.into(),
        })?;

    tracing::info!(user_id = %user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

/// Exchange credentials for a token
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(
    name = "Sign in",
    skip(state, body),
    fields(user_email = %body.email, user_id = tracing::field::Empty)
)]
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignInRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let credentials = Credentials {
        email: body.email,
        password: body.password,
    };

    let user = validate_credentials(credentials, state.users.as_ref())
        .await
        .map_err(|e| match e {
            AuthError::InvalidCredentials(_) => ApiError::InvalidCredentials,
            AuthError::UnexpectedError(e) => ApiError::UnexpectedError(e),
        })?;
    tracing::Span::current().record("user_id", tracing::field::display(&user.id));

    Ok(Json(auth_response(&state, user)?))
}

/// The user the token was issued to
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 400, description = "Invalid or expired token"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User no longer exists"),
    )
)]
#[tracing::instrument(name = "Get current user", skip(state, user), fields(user_id = %user.sub))]
pub async fn current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(user.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(CurrentUserResponse {
        success: true,
        user: user.into(),
    }))
}
