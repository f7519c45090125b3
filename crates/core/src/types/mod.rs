//! Core types for Duka.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod id;
pub mod phone;
pub mod status;

pub use code::{AccountCode, AccountCodeError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use status::SmsStatus;
