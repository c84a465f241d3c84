use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{EmailAddress, Subscriber};
use crate::repositories::RepositoryError;

#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Stores a new active subscriber stamped with the current time.
    async fn insert(&self, email: &EmailAddress) -> Result<Subscriber, RepositoryError>;

    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<Subscriber>, RepositoryError>;

    async fn count_active(&self) -> Result<i64, RepositoryError>;

    /// All subscribers, newest first.
    async fn list(&self) -> Result<Vec<Subscriber>, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
