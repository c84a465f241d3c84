use reqwest::Url;

/// Absolute http(s) URL of an image, usually one served by the image host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrl(String);

impl ImageUrl {
    pub fn parse(s: String) -> Result<ImageUrl, String> {
        let trimmed = s.trim();
        let url = Url::parse(trimmed).map_err(|_| format!("{} is not a valid URL", trimmed))?;
        match url.scheme() {
            "http" | "https" => Ok(Self(trimmed.to_string())),
            other => Err(format!("Unsupported URL scheme '{}' in {}", other, trimmed)),
        }
    }
}

impl AsRef<str> for ImageUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
