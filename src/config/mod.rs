// src/config/mod.rs
pub mod app;
pub mod credentials;
pub mod matcher;

pub use app::{AppConfig, LogAuth, ServiceMode};
pub use credentials::Credentials;
pub use matcher::MatcherConfig;
