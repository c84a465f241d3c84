//! Persistence seams. Handlers only ever talk to these traits; the Postgres
//! adapters live in `crate::adapters`.

mod newsletter_repository;
mod subscriber_repository;
mod user_repository;

pub use newsletter_repository::NewsletterRepository;
pub use subscriber_repository::SubscriberRepository;
pub use user_repository::UserRepository;

use crate::telemetry::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write. Carries the offending field.
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
