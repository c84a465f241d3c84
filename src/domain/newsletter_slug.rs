use regex::Regex;
use std::sync::LazyLock;

static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is a valid regex")
});

/// URL-safe identifier of a newsletter: lowercase ASCII letters and digits,
/// separated by single hyphens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterSlug(String);

impl NewsletterSlug {
    pub const MAX_LENGTH: usize = 120;

    pub fn parse(s: String) -> Result<NewsletterSlug, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Slug is required".to_string());
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(format!(
                "Slug must not be longer than {} characters",
                Self::MAX_LENGTH
            ));
        }
        if !SLUG_PATTERN.is_match(trimmed) {
            return Err(format!(
                "Slug '{}' must contain only lowercase letters, digits and single hyphens",
                trimmed
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for NewsletterSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NewsletterSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
