//! neuromaster-providers: Generative content providers.
//!
//! Implements the `ContentProvider` trait for Google Gemini, plus an offline
//! provider for playing without a backend and a mock for tests.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod offline;

pub use config::{create_provider, load_config, NeuromasterConfig, ProviderConfig};
pub use error::ProviderError;
