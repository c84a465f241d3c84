use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterTitle(String);

impl NewsletterTitle {
    pub const MAX_GRAPHEMES: usize = 200;

    pub fn parse(s: String) -> Result<NewsletterTitle, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Title is required".to_string());
        }
        if trimmed.graphemes(true).count() > Self::MAX_GRAPHEMES {
            return Err(format!(
                "Title must not be longer than {} characters",
                Self::MAX_GRAPHEMES
            ));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for NewsletterTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
