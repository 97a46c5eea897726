use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Order;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_revenue: f64,
    pub total_users: usize,
    pub total_orders: usize,
    pub total_reviews: usize,
    pub revenue_data: Vec<RevenuePoint>,
    pub top_products: Vec<TopProduct>,
    pub recent_orders: Vec<RecentOrder>,
    pub rating_distribution: Vec<RatingCount>,
    pub top_reviewed_products: Vec<ReviewedProduct>,
    pub product_sentiment: Vec<ProductSentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub quantity: u64,
    /// Sum of the line `totalPrice` values.
    pub total_price: f64,
}

/// An order next to the customer's current account data.
///
/// `order.customer` is what was entered at checkout; `customer` is read from
/// the live user record and is `None` once that account is deleted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentOrder {
    pub order: Order,
    pub customer: Option<AccountSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AccountSummary {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingCount {
    pub rating: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedProduct {
    pub product_id: String,
    pub title: String,
    pub image: Option<String>,
    pub review_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSentiment {
    pub product_id: String,
    pub title: String,
    pub good: usize,
    pub neutral: usize,
    pub bad: usize,
    pub total: usize,
}
