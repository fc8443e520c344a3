//! mrec-core: Core library for the mrec measurement record keeper
//!
//! Provides the record model, the in-memory store and its CSV round-trip.
//! No database, no daemon - one CSV file loaded at startup and written back
//! at shutdown.

pub mod config;
pub mod csv_codec;
pub mod error;
pub mod record;
pub mod store;

pub use config::{Config, LoadPolicy};
pub use error::Error;
pub use record::Record;
pub use store::Store;

/// Result type for mrec operations
pub type Result<T> = std::result::Result<T, Error>;
