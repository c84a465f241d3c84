mod postgres_newsletter_repository;
mod postgres_subscriber_repository;
mod postgres_user_repository;

pub use postgres_newsletter_repository::PostgresNewsletterRepository;
pub use postgres_subscriber_repository::PostgresSubscriberRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::repositories::RepositoryError;

/// Translate a failed write into a `RepositoryError`, surfacing unique
/// constraint violations on `field` as `Duplicate`.
fn map_write_error(e: sqlx::Error, field: &'static str, context: &'static str) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            RepositoryError::Duplicate(field)
        }
        _ => {
            tracing::error!("Failed to execute query: {:?}", e);
            RepositoryError::UnexpectedError(anyhow::Error::new(e).context(context))
        }
    }
}
