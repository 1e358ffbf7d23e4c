//! Service implementations
//!
//! Production implementations of the client traits that perform real I/O.

pub mod api_client;

#[cfg(test)]
mod tests;

pub use api_client::RealApiClient;
