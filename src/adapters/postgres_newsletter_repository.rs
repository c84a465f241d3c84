use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::map_write_error;
use crate::domain::{Newsletter, NewsletterDraft};
use crate::repositories::{NewsletterRepository, RepositoryError};

#[derive(Clone, Debug)]
pub struct PostgresNewsletterRepository {
    pool: PgPool,
}

impl PostgresNewsletterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NewsletterRow {
    id: Uuid,
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    template: String,
    status: String,
    cover_image: Option<String>,
    gallery: Vec<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<NewsletterRow> for Newsletter {
    type Error = anyhow::Error;

    fn try_from(row: NewsletterRow) -> Result<Self, Self::Error> {
        Ok(Newsletter {
            id: row.id,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            template: row.template.parse().map_err(anyhow::Error::msg)?,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            cover_image: row.cover_image,
            gallery: row.gallery,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_newsletters(rows: Vec<NewsletterRow>) -> Result<Vec<Newsletter>, RepositoryError> {
    rows.into_iter()
        .map(|row| Newsletter::try_from(row).map_err(RepositoryError::from))
        .collect()
}

fn gallery_urls(draft: &NewsletterDraft) -> Vec<String> {
    draft
        .gallery
        .iter()
        .map(|url| url.as_ref().to_string())
        .collect()
}

#[async_trait]
impl NewsletterRepository for PostgresNewsletterRepository {
    #[tracing::instrument(name = "Insert newsletter into database", skip(self, draft), fields(slug = %draft.slug))]
    async fn insert(
        &self,
        draft: &NewsletterDraft,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Newsletter, RepositoryError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"
            INSERT INTO newsletters (
                id, title, slug, excerpt, content, template, status,
                cover_image, gallery, published_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING id, title, slug, excerpt, content, template, status,
                cover_image, gallery, published_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.title.as_ref())
        .bind(draft.slug.as_ref())
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(draft.template.as_str())
        .bind(draft.status.as_str())
        .bind(draft.cover_image.as_ref().map(|url| url.as_ref()))
        .bind(gallery_urls(draft))
        .bind(published_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "slug", "Failed to insert newsletter."))?;

        Ok(Newsletter::try_from(row)?)
    }

    #[tracing::instrument(name = "Fetch newsletter by id from database", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Newsletter>, RepositoryError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, title, slug, excerpt, content, template, status,
                cover_image, gallery, published_at, created_at, updated_at
            FROM newsletters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch newsletter by id.")?;

        Ok(row.map(Newsletter::try_from).transpose()?)
    }

    #[tracing::instrument(name = "Fetch published newsletter by slug from database", skip(self))]
    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Newsletter>, RepositoryError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, title, slug, excerpt, content, template, status,
                cover_image, gallery, published_at, created_at, updated_at
            FROM newsletters
            WHERE slug = $1 AND status = 'published'
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch newsletter by slug.")?;

        Ok(row.map(Newsletter::try_from).transpose()?)
    }

    #[tracing::instrument(name = "Check whether a newsletter slug is taken", skip(self))]
    async fn slug_taken(
        &self,
        slug: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM newsletters
                WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check newsletter slug.")?;

        Ok(taken)
    }

    #[tracing::instrument(name = "Fetch published newsletters from database", skip(self))]
    async fn list_published(&self) -> Result<Vec<Newsletter>, RepositoryError> {
        let rows = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, title, slug, excerpt, content, template, status,
                cover_image, gallery, published_at, created_at, updated_at
            FROM newsletters
            WHERE status = 'published'
            ORDER BY published_at DESC NULLS LAST, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch published newsletters.")?;

        into_newsletters(rows)
    }

    #[tracing::instrument(name = "Fetch all newsletters from database", skip(self))]
    async fn list_all(&self) -> Result<Vec<Newsletter>, RepositoryError> {
        let rows = sqlx::query_as::<_, NewsletterRow>(
            r#"
            SELECT id, title, slug, excerpt, content, template, status,
                cover_image, gallery, published_at, created_at, updated_at
            FROM newsletters
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch newsletters.")?;

        into_newsletters(rows)
    }

    #[tracing::instrument(name = "Replace newsletter in database", skip(self, draft))]
    async fn replace(
        &self,
        id: Uuid,
        draft: &NewsletterDraft,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Newsletter>, RepositoryError> {
        let row = sqlx::query_as::<_, NewsletterRow>(
            r#"
            UPDATE newsletters
            SET title = $2, slug = $3, excerpt = $4, content = $5, template = $6,
                status = $7, cover_image = $8, gallery = $9, published_at = $10,
                updated_at = now()
            WHERE id = $1
            RETURNING id, title, slug, excerpt, content, template, status,
                cover_image, gallery, published_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(draft.title.as_ref())
        .bind(draft.slug.as_ref())
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(draft.template.as_str())
        .bind(draft.status.as_str())
        .bind(draft.cover_image.as_ref().map(|url| url.as_ref()))
        .bind(gallery_urls(draft))
        .bind(published_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "slug", "Failed to update newsletter."))?;

        Ok(row.map(Newsletter::try_from).transpose()?)
    }

    #[tracing::instrument(name = "Delete newsletter from database", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM newsletters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete newsletter.")?;

        Ok(result.rows_affected() > 0)
    }
}
