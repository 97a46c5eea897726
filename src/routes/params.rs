use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{models::OrderStatus, response::Meta};

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }

    /// Cuts one page out of an already computed listing.
    pub fn apply<T>(&self, items: Vec<T>) -> (Vec<T>, Meta) {
        let (page, per_page, offset) = self.normalize();
        let total = items.len() as i64;
        let page_items = items
            .into_iter()
            .skip(offset as usize)
            .take(per_page as usize)
            .collect();
        (page_items, Meta::new(page, per_page, total))
    }
}

// Query structs repeat the paging fields instead of flattening `Pagination`:
// flattened numbers do not survive url-encoded deserialization.

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive title search.
    pub q: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<OrderStatus>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub product_id: Option<String>,
}

/// Date window of the revenue chart, both ends inclusive.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StatsQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_slices_requested_page() {
        let pagination = Pagination {
            page: Some(2),
            per_page: Some(2),
        };
        let (items, meta) = pagination.apply(vec![1, 2, 3, 4, 5]);
        assert_eq!(items, vec![3, 4]);
        assert_eq!(meta.total, Some(5));
        assert_eq!(meta.page, Some(2));
    }

    #[test]
    fn normalize_clamps_out_of_range_values() {
        let pagination = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(pagination.normalize(), (1, 100, 0));
    }

    #[test]
    fn huge_page_yields_empty_slice() {
        let pagination = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        let (_, _, offset) = pagination.normalize();
        assert_eq!(offset, i64::MAX);

        let (items, meta) = pagination.apply(vec![1, 2, 3]);
        assert!(items.is_empty());
        assert_eq!(meta.total, Some(3));
    }
}
