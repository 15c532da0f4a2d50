//! Validated message body text and its size limits.
//!
//! Bodies are validated at construction so that every [`MessageBody`] held by
//! the rest of the crate is known to be non-empty and within limits.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Limits applied when constructing a [`MessageBody`].
///
/// # Examples
///
/// ```
/// use missive::messaging::domain::ContentLimits;
///
/// let limits = ContentLimits::default();
/// assert_eq!(limits.max_body_bytes, 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContentLimits {
    /// Maximum body length in bytes.
    pub max_body_bytes: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024, // 64 KiB
        }
    }
}

/// The text content of a message or a history snapshot.
///
/// A body is always non-empty after trimming and never exceeds the limit it
/// was validated against. Construction trims surrounding whitespace, matching
/// how content arrives from an input form.
///
/// # Examples
///
/// ```
/// use missive::messaging::domain::{ContentLimits, MessageBody};
///
/// let body = MessageBody::new("  hello  ", &ContentLimits::default()).expect("valid body");
/// assert_eq!(body.as_str(), "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    /// Creates a validated body from raw text.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Empty`] for empty or whitespace-only input and
    /// [`ContentError::TooLarge`] when the trimmed text exceeds
    /// `limits.max_body_bytes`.
    pub fn new(text: impl AsRef<str>, limits: &ContentLimits) -> Result<Self, ContentError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ContentError::Empty);
        }
        if trimmed.len() > limits.max_body_bytes {
            return Err(ContentError::TooLarge {
                actual_bytes: trimmed.len(),
                limit_bytes: limits.max_body_bytes,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Rehydrates a body from previously persisted text without
    /// re-validating, for adapters mapping storage rows back into the
    /// domain.
    #[must_use]
    pub(crate) const fn from_stored(text: String) -> Self {
        Self(text)
    }

    /// Returns the body text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the body length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the body is empty.
    ///
    /// Always `false` for validated bodies; provided for API completeness.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors raised when body text fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The body is empty or whitespace-only.
    #[error("message body cannot be empty")]
    Empty,

    /// The body exceeds the configured size limit.
    #[error("message body of {actual_bytes} bytes exceeds limit of {limit_bytes} bytes")]
    TooLarge {
        /// The actual size in bytes.
        actual_bytes: usize,
        /// The maximum allowed size.
        limit_bytes: usize,
    },
}
