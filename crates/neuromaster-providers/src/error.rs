//! Provider error types.
//!
//! The error enum is defined in `neuromaster-core` so sessions can classify
//! failures; it is re-exported here for provider implementations.

pub use neuromaster_core::error::ProviderError;
