use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::map_write_error;
use crate::domain::{EmailAddress, Subscriber};
use crate::repositories::{RepositoryError, SubscriberRepository};

#[derive(Clone, Debug)]
pub struct PostgresSubscriberRepository {
    pool: PgPool,
}

impl PostgresSubscriberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: Uuid,
    email: String,
    subscribed_at: DateTime<Utc>,
    is_active: bool,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Subscriber {
            id: row.id,
            email: row.email,
            subscribed_at: row.subscribed_at,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl SubscriberRepository for PostgresSubscriberRepository {
    #[tracing::instrument(
        name = "Saving new subscriber details in the database",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn insert(&self, email: &EmailAddress) -> Result<Subscriber, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriberRow>(
            r#"
            INSERT INTO subscribers (id, email, subscribed_at, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id, email, subscribed_at, is_active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email.as_ref())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "email", "Failed to insert subscriber."))?;

        Ok(row.into())
    }

    #[tracing::instrument(name = "Fetch subscriber by email", skip(self, email))]
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, RepositoryError> {
        let row = sqlx::query_as::<_, SubscriberRow>(
            "SELECT id, email, subscribed_at, is_active FROM subscribers WHERE email = $1",
        )
        .bind(email.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch subscriber by email.")?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(name = "Count active subscribers", skip(self))]
    async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscribers WHERE is_active")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count subscribers.")?;

        Ok(count)
    }

    #[tracing::instrument(name = "Fetch all subscribers", skip(self))]
    async fn list(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            r#"
            SELECT id, email, subscribed_at, is_active
            FROM subscribers
            ORDER BY subscribed_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch subscribers.")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(name = "Delete subscriber", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete subscriber.")?;

        Ok(result.rows_affected() > 0)
    }
}
