//! Shared utilities, configuration, and error handling for the chatbot API
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management following 12-factor principles
//! - The application error type and its HTTP mapping
//! - The `{success, message, data, errors}` response envelope
//! - Validating extractors and pagination helpers

pub mod config;
pub mod error;
pub mod extractors;
pub mod pagination;
pub mod response;

pub use error::{Error, Result};
pub use extractors::{ValidatedJson, ValidatedQuery};
pub use pagination::{Page, PageQuery, PageRequest, Pagination};
pub use response::{ApiResponse, FieldError};
