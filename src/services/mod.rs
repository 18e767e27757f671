pub mod auth_service;
pub mod availability_service;
pub mod dress_service;
pub mod profile_service;
