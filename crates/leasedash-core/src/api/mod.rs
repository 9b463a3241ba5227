//! REST API client module for the lease-accounting service.
//!
//! This module provides the `ApiClient` for logging in and fetching
//! reports and templates, along with the error types every call resolves
//! to.
//!
//! The API uses bearer token authentication obtained through `POST /login`.

pub mod client;
pub mod error;
pub mod token;

pub use client::{ApiClient, ClientOptions, LoginResult, RequestOptions};
pub use error::{ApiError, ClientError, FieldErrors};
pub use token::extract_token;
