use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Newsletter, NewsletterDraft};
use crate::repositories::RepositoryError;

#[async_trait]
pub trait NewsletterRepository: Send + Sync {
    async fn insert(
        &self,
        draft: &NewsletterDraft,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Newsletter, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Newsletter>, RepositoryError>;

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Newsletter>, RepositoryError>;

    /// Whether another newsletter already uses `slug`.
    async fn slug_taken(&self, slug: &str, excluding: Option<Uuid>)
    -> Result<bool, RepositoryError>;

    /// Published newsletters, most recently published first.
    async fn list_published(&self) -> Result<Vec<Newsletter>, RepositoryError>;

    /// Every newsletter regardless of status, most recently created first.
    async fn list_all(&self) -> Result<Vec<Newsletter>, RepositoryError>;

    /// Replace all editable fields. `None` when no newsletter has that id.
    async fn replace(
        &self,
        id: Uuid,
        draft: &NewsletterDraft,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Newsletter>, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
