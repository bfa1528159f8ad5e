//! Core business logic abstractions

pub mod allocation;
pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod price;
pub mod request;
pub mod strategy;

// Re-export main types for cleaner imports
pub use allocation::{AllocationEngine, PortfolioReport};
pub use error::{AllocationError, FetchError};
pub use price::{MarketDataProvider, PricePoint};
pub use strategy::StrategyRegistry;
