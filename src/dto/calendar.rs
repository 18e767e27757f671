use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::calendar::{MonthGrid, RentalQuote};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
    /// Current selection as comma-separated `YYYY-MM-DD` dates.
    pub selected: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarView {
    pub grid: MonthGrid,
    pub prev_month: String,
    pub next_month: String,
    pub selection: Vec<NaiveDate>,
    pub quote: RentalQuote,
    pub min_rental_days: i64,
    pub max_rental_days: i64,
}

/// One click on the date picker: the selection the client holds plus the day
/// it clicked.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectDateRequest {
    #[serde(default)]
    pub selected: Vec<NaiveDate>,
    pub clicked: NaiveDate,
    pub month: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelectDateResponse {
    /// False when the clicked day was disabled and nothing changed.
    pub accepted: bool,
    pub selection: Vec<NaiveDate>,
    pub quote: RentalQuote,
    pub grid: MonthGrid,
}
