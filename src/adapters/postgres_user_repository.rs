use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::map_write_error;
use crate::domain::{EmailAddress, NewUser, User, UserUpdate};
use crate::repositories::{RepositoryError, UserRepository};

#[derive(Clone, Debug)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply `update` and replace the password hash in one transaction.
    /// `None` when no user has that id.
    #[tracing::instrument(name = "Promote user", skip(self, update, password_hash))]
    pub async fn update_with_password(
        &self,
        id: Uuid,
        update: &UserUpdate,
        password_hash: Secret<String>,
    ) -> Result<Option<User>, RepositoryError> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .context("Failed to acquire a Postgres connection from the pool")?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, email = $3, role = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name.as_ref())
        .bind(update.email.as_ref())
        .bind(update.role.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|e| map_write_error(e, "email", "Failed to update user."))?;
        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash.expose_secret())
            .execute(&mut *transaction)
            .await
            .context("Failed to change user's password in the database.")?;

        transaction
            .commit()
            .await
            .context("Failed to commit the user update.")?;

        Ok(Some(User::try_from(row)?))
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse().map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(
        name = "Insert user into database",
        skip(self, new_user, password_hash),
        fields(user_email = %new_user.email)
    )]
    async fn insert(
        &self,
        new_user: &NewUser,
        password_hash: Secret<String>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_user.name.as_ref())
        .bind(new_user.email.as_ref())
        .bind(password_hash.expose_secret())
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "email", "Failed to create user in the database."))?;

        Ok(User::try_from(row)?)
    }

    #[tracing::instrument(name = "Fetch user by id", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by id.")?;

        Ok(row.map(User::try_from).transpose()?)
    }

    #[tracing::instrument(name = "Get stored credentials", skip(self, email))]
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, Secret<String>)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, name, email, role, created_at, updated_at, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve stored credentials.")?;

        match row {
            Some(row) => {
                let user = User::try_from(row.user)?;
                Ok(Some((user, Secret::new(row.password_hash))))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(name = "Fetch all users", skip(self))]
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at, updated_at FROM users ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch users.")?;

        rows.into_iter()
            .map(|row| User::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    #[tracing::instrument(name = "Update user in database", skip(self, update))]
    async fn update(
        &self,
        id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, email = $3, role = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name.as_ref())
        .bind(update.email.as_ref())
        .bind(update.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "email", "Failed to update user."))?;

        Ok(row.map(User::try_from).transpose()?)
    }

    #[tracing::instrument(name = "Change password", skip(self, password_hash))]
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: Secret<String>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash.expose_secret())
        .execute(&self.pool)
        .await
        .context("Failed to change user's password in the database.")?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Delete user", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user.")?;

        Ok(result.rows_affected() > 0)
    }
}
