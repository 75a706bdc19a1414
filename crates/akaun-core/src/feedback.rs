use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

pub const ANONYMOUS: &str = "Anonymous";

const MAX_MESSAGE_LEN: usize = 2000;

/// A customer testimonial shown in the storefront gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub name: String,
    pub message: String,
    /// Public URL of the uploaded screenshot.
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackInput {
    #[serde(default)]
    pub name: Option<String>,
    pub message: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl FeedbackInput {
    /// Trim fields and default a blank name to [`ANONYMOUS`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the message is blank or too long.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let message = self.message.trim().to_owned();
        if message.is_empty() {
            return Err(ValidationError::new("message", "must not be blank"));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(ValidationError::new(
                "message",
                format!("must be at most {MAX_MESSAGE_LEN} characters"),
            ));
        }

        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());
        let image = self
            .image
            .map(|i| i.trim().to_owned())
            .filter(|i| !i.is_empty());

        Ok(Self {
            name: Some(name),
            message,
            image,
        })
    }
}
