//! Core library for leasedash.
//!
//! Provides the API client and session layer for a lease-accounting
//! reporting service:
//!
//! - `api`: `ApiClient` for authenticated requests and error normalization
//! - `auth`: `SessionStore` and the durable token storage backends
//! - `models`: users, reports and templates as returned by the service
//! - `config`: application configuration and directory layout

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ClientError, ClientOptions, LoginResult, RequestOptions};
pub use auth::{SessionStore, StorageError, TokenStorage};
pub use config::Config;
