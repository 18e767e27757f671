pub mod backend;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
