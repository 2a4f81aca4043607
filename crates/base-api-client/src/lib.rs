//! HTTP clients for the Base Project API.
//!
//! [`BaseClient`] binds a shared `reqwest::Client` to one resource path under
//! an API base URL. Resource clients such as [`UserClient`] fix that path.

pub mod base_client;
pub mod error;
pub mod user_client;

pub use base_client::BaseClient;
pub use error::ClientError;
pub use user_client::UserClient;
