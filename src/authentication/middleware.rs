use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use std::ops::Deref;

use crate::authentication::Claims;
use crate::routes::ApiError;
use crate::startup::AppState;

/// Claims of a request that carried a valid bearer token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub Claims);

impl Deref for AuthenticatedUser {
    type Target = Claims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A missing header and a non-Bearer scheme are both rejected the same way
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthenticated)?;

        let claims = state.tokens.verify(bearer.token())?;
        Ok(AuthenticatedUser(claims))
    }
}

/// Route layer for the admin routers. Admin handlers read the verified
/// claims back through `Extension<Claims>`.
pub async fn require_admin(
    AuthenticatedUser(claims): AuthenticatedUser,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !claims.is_admin() {
        tracing::warn!(user_id = %claims.sub, "Non-admin attempted to access an admin route");
        return Err(ApiError::Forbidden);
    }
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
