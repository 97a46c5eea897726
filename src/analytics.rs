//! Dashboard figures derived from the raw collections.
//!
//! Everything is recomputed from full collections on each call; nothing is
//! cached between requests.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};

use crate::{
    dto::stats::{
        AccountSummary, AdminStats, ProductSentiment, RatingCount, RecentOrder, RevenuePoint,
        ReviewedProduct, TopProduct,
    },
    error::{AppError, AppResult},
    models::{Order, Product, Review, User},
};

pub const TOP_N: usize = 5;
pub const DEFAULT_RANGE_DAYS: i64 = 7;
pub const MAX_RANGE_DAYS: i64 = 366;

/// Inclusive calendar-day window of the revenue chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Fills missing ends: `end` defaults to `today`, `start` to six days
    /// before `end`.
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> AppResult<Self> {
        let end = end.unwrap_or(today);
        let start = match start {
            Some(start) => start,
            None => end
                .checked_sub_signed(Duration::days(DEFAULT_RANGE_DAYS - 1))
                .ok_or_else(|| AppError::BadRequest("end is out of range".into()))?,
        };
        if start > end {
            return Err(AppError::BadRequest("start must not be after end".into()));
        }
        if (end - start).num_days() >= MAX_RANGE_DAYS {
            return Err(AppError::BadRequest(format!(
                "date range is limited to {MAX_RANGE_DAYS} days"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }
}

enum Stamp {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y, %H:%M:%S",
];

fn parse_stamp(raw: &str) -> Option<Stamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Stamp::Zoned(dt));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Stamp::Naive(dt));
        }
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Stamp::Naive)
}

/// Calendar day of a stored order date, in the timezone it was written in.
pub fn order_day(raw: &str) -> Option<NaiveDate> {
    parse_stamp(raw).map(|stamp| match stamp {
        Stamp::Zoned(dt) => dt.date_naive(),
        Stamp::Naive(dt) => dt.date(),
    })
}

/// Sort key for "newest first". Dates without an offset are taken as UTC.
fn order_instant(raw: &str) -> Option<NaiveDateTime> {
    parse_stamp(raw).map(|stamp| match stamp {
        Stamp::Zoned(dt) => dt.naive_utc(),
        Stamp::Naive(dt) => dt,
    })
}

pub fn total_revenue(orders: &[Order]) -> f64 {
    orders.iter().map(|o| o.total).sum()
}

pub fn revenue_by_day(orders: &[Order], range: &DateRange) -> Vec<RevenuePoint> {
    let mut per_day: HashMap<NaiveDate, f64> = HashMap::new();
    for order in orders {
        if let Some(day) = order_day(&order.date) {
            *per_day.entry(day).or_default() += order.total;
        }
    }
    range
        .days()
        .map(|date| RevenuePoint {
            date,
            revenue: per_day.get(&date).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Line items grouped by display name, best sellers by quantity first.
pub fn top_products(orders: &[Order]) -> Vec<TopProduct> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<TopProduct> = Vec::new();
    for item in orders.iter().flat_map(|o| &o.items) {
        let slot = *index.entry(item.name.as_str()).or_insert_with(|| {
            rows.push(TopProduct {
                name: item.name.clone(),
                quantity: 0,
                total_price: 0.0,
            });
            rows.len() - 1
        });
        let row = &mut rows[slot];
        row.quantity += u64::from(item.quantity);
        row.total_price += item.total_price;
    }
    rows.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    rows.truncate(TOP_N);
    rows
}

pub fn recent_orders(orders: &[Order], users: &[User]) -> Vec<RecentOrder> {
    let accounts: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();
    let mut sorted: Vec<&Order> = orders.iter().collect();
    // `None` sorts before `Some`, so undated orders end up last.
    sorted.sort_by_key(|o| std::cmp::Reverse(order_instant(&o.date)));
    sorted
        .into_iter()
        .map(|order| RecentOrder {
            order: order.clone(),
            customer: order
                .user_id
                .as_deref()
                .and_then(|id| accounts.get(id))
                .map(|user| AccountSummary {
                    name: user.name.clone(),
                    email: user.email.clone(),
                    address: user.address.clone(),
                    city: user.city.clone(),
                    country: user.country.clone(),
                }),
        })
        .collect()
}

pub fn rating_distribution(reviews: &[Review]) -> Vec<RatingCount> {
    let mut counts = [0usize; 5];
    for review in reviews {
        if let Ok(rating @ 1..=5) = usize::try_from(review.rating) {
            counts[rating - 1] += 1;
        }
    }
    (1u8..=5)
        .zip(counts)
        .map(|(rating, count)| RatingCount { rating, count })
        .collect()
}

fn product_title(products: &[Product], product_id: &str) -> (String, Option<String>) {
    products
        .iter()
        .find(|p| p.id.to_string() == product_id)
        .map(|p| (p.title.clone(), Some(p.image.clone())))
        .unwrap_or_else(|| (format!("Product {product_id}"), None))
}

/// Groups reviews by product id, keeping first-seen order for ties.
fn group_by_product(reviews: &[Review]) -> Vec<(&str, Vec<&Review>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Review>)> = Vec::new();
    for review in reviews {
        let slot = *index.entry(review.product_id.as_str()).or_insert_with(|| {
            groups.push((review.product_id.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(review);
    }
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    groups
}

pub fn top_reviewed_products(reviews: &[Review], products: &[Product]) -> Vec<ReviewedProduct> {
    group_by_product(reviews)
        .into_iter()
        .take(TOP_N)
        .map(|(product_id, group)| {
            let (title, image) = product_title(products, product_id);
            ReviewedProduct {
                product_id: product_id.to_string(),
                title,
                image,
                review_count: group.len(),
            }
        })
        .collect()
}

pub fn product_sentiment(reviews: &[Review], products: &[Product]) -> Vec<ProductSentiment> {
    group_by_product(reviews)
        .into_iter()
        .take(TOP_N)
        .map(|(product_id, group)| {
            let good = group.iter().filter(|r| r.rating >= 4).count();
            let bad = group.iter().filter(|r| r.rating <= 2).count();
            let neutral = group.iter().filter(|r| r.rating == 3).count();
            ProductSentiment {
                product_id: product_id.to_string(),
                title: product_title(products, product_id).0,
                good,
                neutral,
                bad,
                total: group.len(),
            }
        })
        .collect()
}

pub fn compute(
    users: &[User],
    orders: &[Order],
    reviews: &[Review],
    products: &[Product],
    range: &DateRange,
) -> AdminStats {
    AdminStats {
        total_revenue: total_revenue(orders),
        total_users: users.len(),
        total_orders: orders.len(),
        total_reviews: reviews.len(),
        revenue_data: revenue_by_day(orders, range),
        top_products: top_products(orders),
        recent_orders: recent_orders(orders, users),
        rating_distribution: rating_distribution(reviews),
        top_reviewed_products: top_reviewed_products(reviews, products),
        product_sentiment: product_sentiment(reviews, products),
    }
}
