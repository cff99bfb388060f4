use std::fmt;

use super::error::StorageError;

const MAX_KEY_LENGTH: usize = 1024;

/// A validated object-store key.
///
/// Keys are slash-separated paths without a leading or trailing slash,
/// e.g. `models/zellige-panel/zellige-panel.ifc`. Case is preserved: the
/// legacy flat layout stores objects under capitalized file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap a key string.
    pub fn parse(key: &str) -> Result<Self, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("key cannot be empty".into()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(StorageError::InvalidKey(format!(
                "key exceeds maximum length of {MAX_KEY_LENGTH} characters"
            )));
        }
        if key.starts_with('/') || key.ends_with('/') {
            return Err(StorageError::InvalidKey(
                "key must not start or end with '/'".into(),
            ));
        }
        for segment in key.split('/') {
            if segment.is_empty() {
                return Err(StorageError::InvalidKey(
                    "key must not contain empty segments".into(),
                ));
            }
            if segment.starts_with('.') {
                return Err(StorageError::InvalidKey(
                    "key segments must not start with '.'".into(),
                ));
            }
        }
        if let Some(c) = key
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '.' | '-')))
        {
            return Err(StorageError::InvalidKey(format!(
                "key contains disallowed character {c:?}"
            )));
        }

        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path segment, used for content-type guessing.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Guess a MIME type from the key's file extension.
    pub fn guess_content_type(&self) -> Option<String> {
        mime_guess::from_path(self.file_name())
            .first()
            .map(|m| m.to_string())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
