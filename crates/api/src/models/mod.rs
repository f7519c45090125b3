//! Domain models for the API.

pub mod customer;
pub mod order;
pub mod user;

pub use customer::Customer;
pub use order::Order;
pub use user::User;
