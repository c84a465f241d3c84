use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::{
    PostgresNewsletterRepository, PostgresSubscriberRepository, PostgresUserRepository,
};
use crate::api_doc::openapi_json;
use crate::authentication::{TokenService, require_admin};
use crate::configuration::{ApplicationSettings, DatabaseSettings, Settings};
use crate::image_host::ImageHostClient;
use crate::repositories::{NewsletterRepository, SubscriberRepository, UserRepository};
use crate::routes::constants::MAX_UPLOAD_BYTES;
use crate::routes::{
    admin_create_newsletter, admin_delete_newsletter, admin_delete_user, admin_get_newsletter,
    admin_get_user, admin_list_newsletters, admin_list_users, admin_update_newsletter,
    admin_update_user, current_user, delete_image, delete_subscriber, get_newsletter_by_slug,
    health_check, list_published_newsletters, list_subscribers, sign_in, sign_up, subscribe,
    subscriber_count, upload_image,
};

/// Connects eagerly so that an unreachable database stops startup.
pub async fn get_connection_pool(
    db_configuration: &DatabaseSettings,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(db_configuration.connect_options())
        .await
}

/// Services shared by every handler, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub newsletters: Arc<dyn NewsletterRepository>,
    pub subscribers: Arc<dyn SubscriberRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: TokenService,
    pub image_host: ImageHostClient,
}

impl AppState {
    pub fn postgres(pool: PgPool, tokens: TokenService, image_host: ImageHostClient) -> Self {
        Self {
            newsletters: Arc::new(PostgresNewsletterRepository::new(pool.clone())),
            subscribers: Arc::new(PostgresSubscriberRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
            tokens,
            image_host,
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&configuration.database)
            .await
            .context("Failed to connect to Postgres.")?;
        sqlx::migrate!("./migrations")
            .run(&connection_pool)
            .await
            .context("Failed to run database migrations.")?;

        let tokens = TokenService::new(
            &configuration.application.jwt_secret,
            configuration.application.token_ttl(),
        );
        let image_host = configuration
            .image_host
            .client()
            .context("Failed to build the image host client.")?;

        let state = AppState::postgres(connection_pool, tokens, image_host);
        Self::build_with_state(&configuration.application, state)
    }

    /// Bind the listener for an already assembled state.
    pub fn build_with_state(
        configuration: &ApplicationSettings,
        state: AppState,
    ) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", configuration.host, configuration.port);
        let listener =
            TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::from_std(self.listener)?;
        tracing::info!(port = self.port, "Listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

pub fn router(state: AppState) -> Router {
    let admin_only = axum::middleware::from_fn_with_state(state.clone(), require_admin);

    let admin = Router::new()
        .route(
            "/newsletters",
            get(admin_list_newsletters).post(admin_create_newsletter),
        )
        .route(
            "/newsletters/{id}",
            get(admin_get_newsletter)
                .put(admin_update_newsletter)
                .delete(admin_delete_newsletter),
        )
        .route("/users", get(admin_list_users))
        .route(
            "/users/{id}",
            get(admin_get_user)
                .put(admin_update_user)
                .delete(admin_delete_user),
        )
        .route_layer(admin_only.clone());

    let auth = Router::new()
        .route("/signup", post(sign_up))
        .route("/register", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/login", post(sign_in))
        .route("/me", get(current_user));

    let api = Router::new()
        .route("/newsletters", get(list_published_newsletters))
        .route("/newsletters/{slug}", get(get_newsletter_by_slug))
        // Subscribing is public, reading the list is not
        .route(
            "/subscribers",
            post(subscribe).merge(get(list_subscribers).route_layer(admin_only.clone())),
        )
        .route("/subscribers/count", get(subscriber_count))
        .route(
            "/subscribers/{id}",
            delete(delete_subscriber).route_layer(admin_only.clone()),
        )
        .route(
            "/cloudinary-upload",
            post(upload_image)
                .delete(delete_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .route_layer(admin_only),
        )
        .nest("/auth", auth)
        .nest("/admin", admin);

    Router::new()
        .route("/health_check", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
