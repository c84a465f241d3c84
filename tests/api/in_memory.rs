//! Repository adapters backed by plain vectors, so the API suite runs without Postgres.
//! Uniqueness and ordering mirror the database schema.
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use newsletter_platform::domain::{
    EmailAddress, NewUser, Newsletter, NewsletterDraft, Subscriber, User, UserUpdate,
};
use newsletter_platform::repositories::{
    NewsletterRepository, RepositoryError, SubscriberRepository, UserRepository,
};

fn newsletter_from_draft(
    id: Uuid,
    draft: &NewsletterDraft,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
) -> Newsletter {
    Newsletter {
        id,
        title: draft.title.as_ref().to_owned(),
        slug: draft.slug.as_ref().to_owned(),
        excerpt: draft.excerpt.clone(),
        content: draft.content.clone(),
        template: draft.template,
        status: draft.status,
        cover_image: draft.cover_image.as_ref().map(|url| url.as_ref().to_owned()),
        gallery: draft
            .gallery
            .iter()
            .map(|url| url.as_ref().to_owned())
            .collect(),
        published_at,
        created_at,
        updated_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct InMemoryNewsletterRepository {
    // Insertion order stands in for `created_at`
    rows: Mutex<Vec<Newsletter>>,
}

#[async_trait]
impl NewsletterRepository for InMemoryNewsletterRepository {
    async fn insert(
        &self,
        draft: &NewsletterDraft,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Newsletter, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|n| n.slug == draft.slug.as_ref()) {
            return Err(RepositoryError::Duplicate("slug"));
        }
        let newsletter = newsletter_from_draft(Uuid::new_v4(), draft, published_at, Utc::now());
        rows.push(newsletter.clone());
        Ok(newsletter)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Newsletter>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|n| n.id == id).cloned())
    }

    async fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Newsletter>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.slug == slug && n.status.as_str() == "published")
            .cloned())
    }

    async fn slug_taken(
        &self,
        slug: &str,
        excluding: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.slug == slug && Some(n.id) != excluding))
    }

    async fn list_published(&self) -> Result<Vec<Newsletter>, RepositoryError> {
        let mut published: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|n| n.status.as_str() == "published")
            .cloned()
            .collect();
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(published)
    }

    async fn list_all(&self) -> Result<Vec<Newsletter>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn replace(
        &self,
        id: Uuid,
        draft: &NewsletterDraft,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Newsletter>, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|n| n.slug == draft.slug.as_ref() && n.id != id)
        {
            return Err(RepositoryError::Duplicate("slug"));
        }
        let Some(row) = rows.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        *row = newsletter_from_draft(id, draft, published_at, row.created_at);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|n| n.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemorySubscriberRepository {
    rows: Mutex<Vec<Subscriber>>,
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn insert(&self, email: &EmailAddress) -> Result<Subscriber, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|s| s.email == email.as_ref()) {
            return Err(RepositoryError::Duplicate("email"));
        }
        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email: email.as_ref().to_owned(),
            subscribed_at: Utc::now(),
            is_active: true,
        };
        rows.push(subscriber.clone());
        Ok(subscriber)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.email == email.as_ref())
            .cloned())
    }

    async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count = self.rows.lock().unwrap().iter().filter(|s| s.is_active).count();
        Ok(count as i64)
    }

    async fn list(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().rev().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<(User, Secret<String>)>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(
        &self,
        new_user: &NewUser,
        password_hash: Secret<String>,
    ) -> Result<User, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|(u, _)| u.email == new_user.email.as_ref()) {
            return Err(RepositoryError::Duplicate("email"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.as_ref().to_owned(),
            email: new_user.email.as_ref().to_owned(),
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        rows.push((user.clone(), password_hash));
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<(User, Secret<String>)>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email == email.as_ref())
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|(u, _)| u.email == update.email.as_ref() && u.id != id)
        {
            return Err(RepositoryError::Duplicate("email"));
        }
        let Some((user, _)) = rows.iter_mut().find(|(u, _)| u.id == id) else {
            return Ok(None);
        };
        user.name = update.name.as_ref().to_owned();
        user.email = update.email.as_ref().to_owned();
        user.role = update.role;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: Secret<String>,
    ) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|(u, _)| u.id == id) {
            Some((_, hash)) => {
                *hash = password_hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(u, _)| u.id != id);
        Ok(rows.len() < before)
    }
}
