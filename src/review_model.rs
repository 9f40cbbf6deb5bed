//! Customer review records and the persisted blob that holds them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::app_response::AppResponse;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Product id (as a string key) to reviews in submission order, oldest first.
pub type ReviewBlob = BTreeMap<String, Vec<Review>>;

/// An appended review. Never edited or removed once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Millisecond creation timestamp, strictly increasing per product.
    pub id: i64,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub image: Option<String>,
}

/// What the user typed before a review is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,
}

impl ReviewDraft {
    /// Rating 0 is the "not yet rated" sentinel and is rejected along with
    /// anything above the scale.
    pub fn validate(&self) -> Result<(), AppResponse> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(AppResponse::ValidationError(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}, got {}",
                self.rating
            )));
        }
        if self.comment.trim().is_empty() {
            return Err(AppResponse::ValidationError(
                "Please provide a rating and comment.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_review(self, id: i64) -> Review {
        Review {
            id,
            name: self.name,
            rating: self.rating,
            comment: self.comment,
            image: self.image,
        }
    }
}

// Older blobs store a missing image as "".
fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
