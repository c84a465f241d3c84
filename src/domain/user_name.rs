use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    const MAX_GRAPHEMES: usize = 256;
    const FORBIDDEN_CHARACTERS: [char; 9] = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];

    /// Returns an instance of `UserName` if the input satisfies all
    /// our validation constraints on user names, an error message otherwise.
    pub fn parse(s: String) -> Result<UserName, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Name is required".to_string());
        }
        if trimmed.graphemes(true).count() > Self::MAX_GRAPHEMES {
            return Err(format!(
                "Name must not be longer than {} characters",
                Self::MAX_GRAPHEMES
            ));
        }
        if trimmed
            .chars()
            .any(|c| Self::FORBIDDEN_CHARACTERS.contains(&c))
        {
            return Err(format!("{} is not a valid name", trimmed));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
