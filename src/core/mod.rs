//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod history;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use error::SourceError;
pub use history::{HistoricalRatePoint, HistoryStore, HistoryWrite};
pub use rate::{ExchangeRate, RateProvider};
