//! Client core for the FPL team optimizer service
//!
//! Provides a keyed resource cache with staleness and deduplicated fetches,
//! cached accessors for the service's read endpoints, a race-safe mutation
//! controller for optimization requests, and pure view-model derivations.

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod fpl_client;
pub mod mutation;
pub mod queries;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheKey, CachePolicy, CacheStats, CacheStatus, QueryState, ResourceCache, Subscription};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use fpl_client::FplClient;
pub use mutation::{MutationController, MutationSnapshot, MutationStatus};
pub use queries::{Queries, QueryResult};
pub use services::RealApiClient;
pub use traits::ApiClient;
