use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::domain::{ImageUrl, NewsletterSlug, NewsletterTitle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NewsletterStatus {
    #[default]
    Draft,
    Published,
}

impl NewsletterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsletterStatus::Draft => "draft",
            NewsletterStatus::Published => "published",
        }
    }
}

impl std::fmt::Display for NewsletterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NewsletterStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => Err(format!("{} is not a valid newsletter status", other)),
        }
    }
}

/// Content layout a newsletter is rendered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum NewsletterTemplate {
    #[default]
    Default,
    EventRecap,
    Workshop,
    Announcement,
}

impl NewsletterTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsletterTemplate::Default => "default",
            NewsletterTemplate::EventRecap => "event-recap",
            NewsletterTemplate::Workshop => "workshop",
            NewsletterTemplate::Announcement => "announcement",
        }
    }
}

impl std::fmt::Display for NewsletterTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NewsletterTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "event-recap" => Ok(Self::EventRecap),
            "workshop" => Ok(Self::Workshop),
            "announcement" => Ok(Self::Announcement),
            other => Err(format!("{} is not a valid newsletter template", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Newsletter {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub template: NewsletterTemplate,
    pub status: NewsletterStatus,
    pub cover_image: Option<String>,
    pub gallery: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `publishedAt` is stamped the first time a newsletter is published and never
/// changes afterwards, not even when it is moved back to draft.
pub fn resolve_published_at(
    status: NewsletterStatus,
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (previous, status) {
        (Some(published_at), _) => Some(published_at),
        (None, NewsletterStatus::Published) => Some(now),
        (None, NewsletterStatus::Draft) => None,
    }
}

/// Newsletter request body as sent by the admin editor.
///
/// Every field is optional at the serde level so that missing fields
/// surface as validation messages instead of deserialization failures.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsletterInput {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub template: Option<NewsletterTemplate>,
    pub status: Option<NewsletterStatus>,
    pub cover_image: Option<String>,
    pub gallery: Option<Vec<String>>,
}

/// A validated newsletter, ready to be written.
#[derive(Debug, Clone)]
pub struct NewsletterDraft {
    pub title: NewsletterTitle,
    pub slug: NewsletterSlug,
    pub excerpt: String,
    pub content: String,
    pub template: NewsletterTemplate,
    pub status: NewsletterStatus,
    pub cover_image: Option<ImageUrl>,
    pub gallery: Vec<ImageUrl>,
}

impl NewsletterDraft {
    pub const MAX_EXCERPT_GRAPHEMES: usize = 500;
}

impl TryFrom<NewsletterInput> for NewsletterDraft {
    type Error = String;

    fn try_from(value: NewsletterInput) -> Result<Self, Self::Error> {
        let title = NewsletterTitle::parse(value.title)?;
        let slug = NewsletterSlug::parse(value.slug)?;
        if value.content.trim().is_empty() {
            return Err("Content is required".to_string());
        }
        let excerpt = value.excerpt.unwrap_or_default().trim().to_string();
        if excerpt.graphemes(true).count() > Self::MAX_EXCERPT_GRAPHEMES {
            return Err(format!(
                "Excerpt must not be longer than {} characters",
                Self::MAX_EXCERPT_GRAPHEMES
            ));
        }
        // The editor sends an empty string when no cover image was chosen
        let cover_image = value
            .cover_image
            .filter(|url| !url.trim().is_empty())
            .map(ImageUrl::parse)
            .transpose()?;
        let gallery = value
            .gallery
            .unwrap_or_default()
            .into_iter()
            .map(ImageUrl::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title,
            slug,
            excerpt,
            content: value.content,
            template: value.template.unwrap_or_default(),
            status: value.status.unwrap_or_default(),
            cover_image,
            gallery,
        })
    }
}
