//! skillbridge-client: backends for the SkillBridge learning API.
//!
//! Implements the `LearningBackend` trait over HTTP (bearer-token REST plus
//! callable functions) and in memory from a lesson catalog.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod mock;

pub use auth::{StaticToken, TokenProvider};
pub use config::{create_backend, load_config, load_config_from, SkillbridgeConfig};
pub use error::ClientError;
pub use http::HttpBackend;
pub use mock::MockBackend;
