//! Test helpers for driving the client against a stub server
use std::time::Duration;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use client::{CacheStatus, ClientConfig, FplClient, QueryResult};

/// Helper functions to reduce test boilerplate
pub struct TestHelpers;

impl TestHelpers {
    /// Client wired to `server`
    pub fn client_for(server: &MockServer) -> FplClient {
        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(5));
        FplClient::new(config).expect("Valid test client")
    }

    /// Serve `body` on `verb path`, expecting exactly `times` calls
    pub async fn mount_json(server: &MockServer, verb: &str, route: &str, body: Value, times: u64) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(server)
            .await;
    }

    /// Poll `read` until it reports `status`, giving up after two seconds
    pub async fn wait_for_status<T, F, Fut>(mut read: F, status: CacheStatus) -> QueryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = QueryResult<T>>,
    {
        for _ in 0..200 {
            let result = read().await;
            if result.status == status {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("entry never reached status {status}");
    }
}
