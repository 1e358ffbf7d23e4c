//! Service-specific tests
//!
//! The reqwest client is exercised against a local wiremock server.

#[cfg(test)]
mod api_client;

#[cfg(test)]
pub mod common {
    use std::time::Duration;
    use wiremock::MockServer;

    use crate::config::ClientConfig;
    use crate::services::RealApiClient;

    /// Client pointed at `server` with a short timeout
    pub fn client_for(server: &MockServer) -> RealApiClient {
        client_with_timeout(server, Duration::from_secs(5))
    }

    pub fn client_with_timeout(server: &MockServer, timeout: Duration) -> RealApiClient {
        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_timeout(timeout);
        RealApiClient::new(&config).expect("Valid test client config")
    }
}
