//! Adapter tests against a real Postgres instance.
//!
//! Run with `cargo test --features postgres-tests`; every test gets its own
//! freshly migrated database.

use claims::{assert_none, assert_ok, assert_some};
use secrecy::{ExposeSecret, Secret};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use newsletter_platform::adapters::{
    PostgresNewsletterRepository, PostgresSubscriberRepository, PostgresUserRepository,
};
use newsletter_platform::configuration::{DatabaseSettings, get_configuration};
use newsletter_platform::domain::{
    EmailAddress, NewUser, NewsletterDraft, NewsletterInput, NewsletterStatus, UserName,
    UserRole, UserUpdate,
};
use newsletter_platform::repositories::{
    NewsletterRepository, RepositoryError, SubscriberRepository, UserRepository,
};

async fn configure_database() -> PgPool {
    let mut config: DatabaseSettings = get_configuration()
        .expect("Failed to read configuration.")
        .database;
    config.database_name = Uuid::new_v4().to_string();

    // Create database
    let maintenance_settings = DatabaseSettings {
        database_name: "postgres".to_string(),
        ..config.clone()
    };
    let mut connection = PgConnection::connect_with(&maintenance_settings.connect_options())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect_with(config.connect_options())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");
    connection_pool
}

fn draft(slug: &str, status: NewsletterStatus) -> NewsletterDraft {
    NewsletterDraft::try_from(NewsletterInput {
        title: "Spring workshop recap".into(),
        slug: slug.into(),
        content: "Thanks for coming!".into(),
        status: Some(status),
        gallery: Some(vec![
            "https://res.cloudinary.com/demo/image/upload/v1/newsletters/a.png".into(),
        ]),
        ..Default::default()
    })
    .unwrap()
}

fn email(s: &str) -> EmailAddress {
    EmailAddress::parse(s.to_string()).unwrap()
}

fn new_user(address: &str, role: UserRole) -> NewUser {
    NewUser {
        name: UserName::parse("Ursula".to_string()).unwrap(),
        email: email(address),
        role,
    }
}

#[tokio::test]
async fn newsletters_round_trip_through_postgres() {
    let repository = PostgresNewsletterRepository::new(configure_database().await);
    let published_at = chrono::Utc::now();

    let stored = repository
        .insert(&draft("spring-recap", NewsletterStatus::Published), Some(published_at))
        .await
        .unwrap();

    let found = assert_some!(repository.find_published_by_slug("spring-recap").await.unwrap());
    assert_eq!(found.id, stored.id);
    assert_eq!(found.gallery.len(), 1);
    assert!(repository.slug_taken("spring-recap", None).await.unwrap());
    assert!(!repository.slug_taken("spring-recap", Some(stored.id)).await.unwrap());
}

#[tokio::test]
async fn duplicate_slugs_are_reported_as_duplicates() {
    let repository = PostgresNewsletterRepository::new(configure_database().await);
    repository
        .insert(&draft("taken", NewsletterStatus::Draft), None)
        .await
        .unwrap();

    let outcome = repository
        .insert(&draft("taken", NewsletterStatus::Draft), None)
        .await;

    assert!(matches!(outcome, Err(RepositoryError::Duplicate("slug"))));
}

#[tokio::test]
async fn drafts_are_hidden_from_published_queries() {
    let repository = PostgresNewsletterRepository::new(configure_database().await);
    repository
        .insert(&draft("hidden", NewsletterStatus::Draft), None)
        .await
        .unwrap();

    assert_none!(repository.find_published_by_slug("hidden").await.unwrap());
    assert!(repository.list_published().await.unwrap().is_empty());
    assert_eq!(repository.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn replacing_and_deleting_newsletters() {
    let repository = PostgresNewsletterRepository::new(configure_database().await);
    let stored = repository
        .insert(&draft("before", NewsletterStatus::Draft), None)
        .await
        .unwrap();

    let replaced = assert_some!(
        repository
            .replace(stored.id, &draft("after", NewsletterStatus::Draft), None)
            .await
            .unwrap()
    );

    assert_eq!(replaced.slug, "after");
    assert_none!(
        repository
            .replace(Uuid::new_v4(), &draft("ghost", NewsletterStatus::Draft), None)
            .await
            .unwrap()
    );
    assert!(repository.delete(stored.id).await.unwrap());
    assert!(!repository.delete(stored.id).await.unwrap());
}

#[tokio::test]
async fn subscribers_are_unique_and_counted() {
    let repository = PostgresSubscriberRepository::new(configure_database().await);
    let first = repository.insert(&email("first@example.com")).await.unwrap();
    repository.insert(&email("second@example.com")).await.unwrap();

    let duplicate = repository.insert(&email("first@example.com")).await;

    assert!(matches!(duplicate, Err(RepositoryError::Duplicate("email"))));
    assert_eq!(repository.count_active().await.unwrap(), 2);
    assert_some!(repository.find_by_email(&email("first@example.com")).await.unwrap());
    let listed: Vec<_> = repository
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.email)
        .collect();
    assert_eq!(listed, vec!["second@example.com", "first@example.com"]);
    assert!(repository.delete(first.id).await.unwrap());
    assert_eq!(repository.count_active().await.unwrap(), 1);
}

#[tokio::test]
async fn credentials_are_only_returned_by_the_credentials_lookup() {
    let repository = PostgresUserRepository::new(configure_database().await);
    let user = repository
        .insert(
            &new_user("reader@example.com", UserRole::Reader),
            Secret::new("$argon2id$stored".to_string()),
        )
        .await
        .unwrap();

    let (found, hash) = assert_some!(
        repository
            .find_credentials(&email("reader@example.com"))
            .await
            .unwrap()
    );

    assert_eq!(found, user);
    assert_eq!(hash.expose_secret(), "$argon2id$stored");
    assert_some!(repository.find_by_id(user.id).await.unwrap());
}

#[tokio::test]
async fn users_can_be_updated_but_not_onto_a_taken_email() {
    let repository = PostgresUserRepository::new(configure_database().await);
    let admin = repository
        .insert(
            &new_user("admin@example.com", UserRole::Admin),
            Secret::new("hash".to_string()),
        )
        .await
        .unwrap();
    let reader = repository
        .insert(
            &new_user("reader@example.com", UserRole::Reader),
            Secret::new("hash".to_string()),
        )
        .await
        .unwrap();

    let promoted = assert_some!(
        repository
            .update(
                reader.id,
                &UserUpdate {
                    name: UserName::parse("Promoted".to_string()).unwrap(),
                    email: email("reader@example.com"),
                    role: UserRole::Admin,
                },
            )
            .await
            .unwrap()
    );
    let clash = repository
        .update(
            reader.id,
            &UserUpdate {
                name: UserName::parse("Promoted".to_string()).unwrap(),
                email: email("admin@example.com"),
                role: UserRole::Admin,
            },
        )
        .await;

    assert_eq!(promoted.role, UserRole::Admin);
    assert!(matches!(clash, Err(RepositoryError::Duplicate("email"))));
    assert_ok!(
        repository
            .update_password(admin.id, Secret::new("new-hash".to_string()))
            .await
    );
    assert_eq!(repository.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn published_newsletters_are_listed_by_publication_date() {
    let repository = PostgresNewsletterRepository::new(configure_database().await);
    let now = chrono::Utc::now();
    repository
        .insert(
            &draft("older-pub", NewsletterStatus::Published),
            Some(now - chrono::Duration::days(2)),
        )
        .await
        .unwrap();
    repository
        .insert(
            &draft("newer-pub", NewsletterStatus::Published),
            Some(now - chrono::Duration::days(1)),
        )
        .await
        .unwrap();
    // Created last but published earliest
    repository
        .insert(
            &draft("oldest-pub", NewsletterStatus::Published),
            Some(now - chrono::Duration::days(3)),
        )
        .await
        .unwrap();
    repository
        .insert(&draft("a-draft", NewsletterStatus::Draft), None)
        .await
        .unwrap();

    let slugs: Vec<_> = repository
        .list_published()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.slug)
        .collect();

    assert_eq!(slugs, vec!["newer-pub", "older-pub", "oldest-pub"]);
}

#[tokio::test]
async fn admin_listing_is_newest_created_first() {
    let repository = PostgresNewsletterRepository::new(configure_database().await);
    let now = chrono::Utc::now();
    repository
        .insert(&draft("first", NewsletterStatus::Published), Some(now))
        .await
        .unwrap();
    repository
        .insert(
            &draft("second", NewsletterStatus::Published),
            Some(now - chrono::Duration::days(7)),
        )
        .await
        .unwrap();
    repository
        .insert(&draft("third", NewsletterStatus::Draft), None)
        .await
        .unwrap();

    let slugs: Vec<_> = repository
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.slug)
        .collect();

    assert_eq!(slugs, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn users_are_listed_newest_first() {
    let repository = PostgresUserRepository::new(configure_database().await);
    for address in ["first@example.com", "second@example.com", "third@example.com"] {
        repository
            .insert(
                &new_user(address, UserRole::Reader),
                Secret::new("hash".to_string()),
            )
            .await
            .unwrap();
    }

    let emails: Vec<_> = repository
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.email)
        .collect();

    assert_eq!(
        emails,
        vec!["third@example.com", "second@example.com", "first@example.com"]
    );
}

#[tokio::test]
async fn promoting_a_user_replaces_role_and_password_together() {
    let repository = PostgresUserRepository::new(configure_database().await);
    let reader = repository
        .insert(
            &new_user("reader@example.com", UserRole::Reader),
            Secret::new("old-hash".to_string()),
        )
        .await
        .unwrap();

    let promoted = assert_some!(
        repository
            .update_with_password(
                reader.id,
                &UserUpdate {
                    name: UserName::parse("Ursula".to_string()).unwrap(),
                    email: email("reader@example.com"),
                    role: UserRole::Admin,
                },
                Secret::new("new-hash".to_string()),
            )
            .await
            .unwrap()
    );

    assert_eq!(promoted.role, UserRole::Admin);
    let (_, hash) = assert_some!(
        repository
            .find_credentials(&email("reader@example.com"))
            .await
            .unwrap()
    );
    assert_eq!(hash.expose_secret(), "new-hash");
    assert_none!(
        repository
            .update_with_password(
                Uuid::new_v4(),
                &UserUpdate {
                    name: UserName::parse("Nobody".to_string()).unwrap(),
                    email: email("nobody@example.com"),
                    role: UserRole::Admin,
                },
                Secret::new("hash".to_string()),
            )
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn a_failed_promotion_keeps_the_old_password() {
    let repository = PostgresUserRepository::new(configure_database().await);
    repository
        .insert(
            &new_user("admin@example.com", UserRole::Admin),
            Secret::new("admin-hash".to_string()),
        )
        .await
        .unwrap();
    let reader = repository
        .insert(
            &new_user("reader@example.com", UserRole::Reader),
            Secret::new("old-hash".to_string()),
        )
        .await
        .unwrap();

    let outcome = repository
        .update_with_password(
            reader.id,
            &UserUpdate {
                name: UserName::parse("Ursula".to_string()).unwrap(),
                email: email("admin@example.com"),
                role: UserRole::Admin,
            },
            Secret::new("new-hash".to_string()),
        )
        .await;

    assert!(matches!(outcome, Err(RepositoryError::Duplicate("email"))));
    let (stored, hash) = assert_some!(
        repository
            .find_credentials(&email("reader@example.com"))
            .await
            .unwrap()
    );
    assert_eq!(stored.role, UserRole::Reader);
    assert_eq!(hash.expose_secret(), "old-hash");
}
