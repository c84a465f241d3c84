mod email_address;
mod image_url;
mod newsletter;
mod newsletter_slug;
mod newsletter_title;
mod subscriber;
mod user;
mod user_name;

pub use email_address::EmailAddress;
pub use image_url::ImageUrl;
pub use newsletter::{
    Newsletter, NewsletterDraft, NewsletterInput, NewsletterStatus, NewsletterTemplate,
    resolve_published_at,
};
pub use newsletter_slug::NewsletterSlug;
pub use newsletter_title::NewsletterTitle;
pub use subscriber::Subscriber;
pub use user::{NewUser, User, UserRole, UserUpdate};
pub use user_name::UserName;
