use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, format_price};

/// A price as sent by the admin form: either a number or text such as
/// `"12"` or `"$12.50"`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceInput {
    Amount(f64),
    Text(String),
}

impl PriceInput {
    /// Normalizes to the stored `$0.00` form.
    pub fn to_stored(&self) -> Option<String> {
        let amount = match self {
            PriceInput::Amount(amount) => *amount,
            PriceInput::Text(text) => text.trim().trim_start_matches('$').replace(',', "").parse::<f64>().ok()?,
        };
        (amount.is_finite() && amount >= 0.0).then(|| format_price(amount))
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: Option<String>,
    pub price: Option<PriceInput>,
    pub old_price: Option<PriceInput>,
    pub image: Option<String>,
    pub badge: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub price: Option<PriceInput>,
    pub old_price: Option<PriceInput>,
    pub image: Option<String>,
    pub badge: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<Product>,
}
