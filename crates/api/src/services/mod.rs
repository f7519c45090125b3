//! Business services for the API.

pub mod auth;
pub mod orders;
