use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Review, string_or_number};

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    string_or_number(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    /// Stored as given; out-of-range values are only filtered in statistics.
    pub rating: Option<i64>,
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub product_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewList {
    pub reviews: Vec<Review>,
}
