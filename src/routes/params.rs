use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::dresses::DressFilters;

#[derive(Debug, Default, Deserialize, ToSchema)]
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
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortOrder::Asc)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DressSortBy {
    CreatedAt,
    Price,
    Title,
}

impl DressSortBy {
    pub fn column(&self) -> &'static str {
        match self {
            DressSortBy::CreatedAt => "created_at",
            DressSortBy::Price => "price",
            DressSortBy::Title => "title",
        }
    }
}

/// Browse query. List filters take comma-separated values
/// (`?types=Party,Formal&sizes=S,M`).
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DressQuery {
    /// Page number, default 1
    pub page: Option<i64>,
    /// Items per page, default 20, at most 100
    pub per_page: Option<i64>,
    /// Case-insensitive title search
    pub q: Option<String>,
    pub types: Option<String>,
    pub colors: Option<String>,
    pub sizes: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub owner_id: Option<Uuid>,
    /// Hide dresses booked or blocked on any day in the window
    pub available_from: Option<NaiveDate>,
    pub available_to: Option<NaiveDate>,
    pub sort_by: Option<DressSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl DressQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn filters(&self) -> DressFilters {
        DressFilters {
            types: split_list(self.types.as_deref()),
            colors: split_list(self.colors.as_deref()),
            sizes: split_list(self.sizes.as_deref()),
            min_price: self.min_price,
            max_price: self.max_price,
            search: self.q.clone(),
            owner_id: self.owner_id,
        }
    }

    /// The availability window, when either end is given. A missing end
    /// collapses the window to a single day.
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.available_from, self.available_to) {
            (Some(from), Some(to)) => Some((from, to)),
            (Some(day), None) | (None, Some(day)) => Some((day, day)),
            (None, None) => None,
        }
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
