use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(title = "Newsletter platform API"),
    paths(
        routes::health_check::health_check,
        routes::auth::sign_up,
        routes::auth::sign_in,
        routes::auth::current_user,
        routes::newsletters::list_published_newsletters,
        routes::newsletters::get_newsletter_by_slug,
        routes::admin::newsletters::admin_list_newsletters,
        routes::admin::newsletters::admin_get_newsletter,
        routes::admin::newsletters::admin_create_newsletter,
        routes::admin::newsletters::admin_update_newsletter,
        routes::admin::newsletters::admin_delete_newsletter,
        routes::admin::users::admin_list_users,
        routes::admin::users::admin_get_user,
        routes::admin::users::admin_update_user,
        routes::admin::users::admin_delete_user,
        routes::subscribers::subscribe,
        routes::subscribers::subscriber_count,
        routes::subscribers::list_subscribers,
        routes::subscribers::delete_subscriber,
        routes::uploads::upload_image,
        routes::uploads::delete_image,
    ),
    modifiers(&BearerToken),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Sign-up, sign-in and the current user"),
        (name = "newsletters", description = "Public newsletter listing"),
        (name = "admin-newsletters", description = "Newsletter authoring"),
        (name = "admin-users", description = "User management"),
        (name = "subscribers", description = "Email subscriptions"),
        (name = "uploads", description = "Image host proxy"),
    )
)]
pub struct ApiDoc;

struct BearerToken;

impl Modify for BearerToken {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
