//! Process configuration for Base Project services.
//!
//! `Settings` is built once at startup from layered key-value sources and
//! handed down to whatever needs it. Nothing in this crate holds global state.

pub mod config;
pub mod error;
pub mod secret;
pub mod settings;
pub mod tracing;

pub use error::ConfigurationError;
pub use secret::SecretStr;
pub use settings::{DatabaseConfig, RedisConfig, Settings};
