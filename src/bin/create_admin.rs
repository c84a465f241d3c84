//! Create an admin account, or promote an existing account to admin.
//!
//! Usage: `create_admin <name> <email> <password>`. Missing arguments are
//! read from `ADMIN_NAME`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`.

use anyhow::Context;
use secrecy::Secret;

use newsletter_platform::adapters::PostgresUserRepository;
use newsletter_platform::authentication::{hash_password, validate_password_length};
use newsletter_platform::configuration::get_configuration;
use newsletter_platform::domain::{EmailAddress, NewUser, UserName, UserRole, UserUpdate};
use newsletter_platform::repositories::UserRepository;
use newsletter_platform::startup::get_connection_pool;
use newsletter_platform::telemetry::{get_subscriber, init_subscriber};

fn argument(args: &mut impl Iterator<Item = String>, variable: &str) -> anyhow::Result<String> {
    args.next()
        .or_else(|| std::env::var(variable).ok())
        .with_context(|| format!("Missing argument, pass it or set {}", variable))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber(get_subscriber(
        "create_admin".into(),
        "info".into(),
        std::io::stderr,
    ));

    let mut args = std::env::args().skip(1);
    let name = UserName::parse(argument(&mut args, "ADMIN_NAME")?).map_err(anyhow::Error::msg)?;
    let email =
        EmailAddress::parse(argument(&mut args, "ADMIN_EMAIL")?).map_err(anyhow::Error::msg)?;
    let password = Secret::new(argument(&mut args, "ADMIN_PASSWORD")?);
    validate_password_length(&password)?;

    let configuration = get_configuration()?;
    let pool = get_connection_pool(&configuration.database)
        .await
        .context("Failed to connect to Postgres.")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations.")?;
    let users = PostgresUserRepository::new(pool);

    let password_hash = hash_password(password).await?;
    match users.find_credentials(&email).await? {
        Some((existing, _)) => {
            let update = UserUpdate {
                name,
                email,
                role: UserRole::Admin,
            };
            users
                .update_with_password(existing.id, &update, password_hash)
                .await?
                .context("User disappeared while being promoted")?;
            tracing::info!(user_id = %existing.id, "Promoted existing user to admin");
        }
        None => {
            let new_user = NewUser {
                name,
                email,
                role: UserRole::Admin,
            };
            let user = users.insert(&new_user, password_hash).await?;
            tracing::info!(user_id = %user.id, "Created admin user");
        }
    }

    Ok(())
}
