pub mod auth;
pub mod availability;
pub mod calendar;
pub mod dresses;
pub mod profiles;
