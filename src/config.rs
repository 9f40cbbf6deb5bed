//! Startup configuration handed over by the host as JSON.

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::catalog::RELATED_LIMIT;
use crate::local_db_state::DEFAULT_MAP_SIZE;
use crate::review_store::DEFAULT_REVIEWS_KEY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Device store directory is `<db_name>.lmdb`.
    pub db_name: String,
    pub map_size_bytes: usize,
    pub reviews_key: String,
    pub orders_collection: String,
    pub orders_user_field: String,
    pub related_limit: usize,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            db_name: "storefront".to_string(),
            map_size_bytes: DEFAULT_MAP_SIZE,
            reviews_key: DEFAULT_REVIEWS_KEY.to_string(),
            orders_collection: "orderManager".to_string(),
            orders_user_field: "userId".to_string(),
            related_limit: RELATED_LIMIT,
        }
    }
}

impl StorefrontConfig {
    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if self.db_name.trim().is_empty() {
            return Err(AppResponse::ValidationError("db_name cannot be empty".to_string()));
        }
        if self.map_size_bytes == 0 {
            return Err(AppResponse::ValidationError(
                "map_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.related_limit == 0 {
            return Err(AppResponse::ValidationError(
                "related_limit must be greater than zero".to_string(),
            ));
        }
        if self.reviews_key.is_empty() {
            return Err(AppResponse::ValidationError("reviews_key cannot be empty".to_string()));
        }
        Ok(())
    }
}
