use async_trait::async_trait;
use secrecy::Secret;
use uuid::Uuid;

use crate::domain::{EmailAddress, NewUser, User, UserUpdate};
use crate::repositories::RepositoryError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(
        &self,
        new_user: &NewUser,
        password_hash: Secret<String>,
    ) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// The only lookup that exposes the stored password hash.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, Secret<String>)>, RepositoryError>;

    /// All users, newest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    async fn update(&self, id: Uuid, update: &UserUpdate)
    -> Result<Option<User>, RepositoryError>;

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: Secret<String>,
    ) -> Result<bool, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
