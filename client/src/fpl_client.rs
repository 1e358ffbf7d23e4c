//! Top-level client wiring
//!
//! Builds the single cache instance and hands it to the query accessors and
//! the mutation controller.

use std::sync::Arc;
use tracing::info;

use crate::cache::{ResourceCache, SweeperHandle};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::mutation::MutationController;
use crate::queries::Queries;
use crate::services::RealApiClient;
use crate::traits::ApiClient;

/// Cache, accessors and controller sharing one API connection
pub struct FplClient {
    config: ClientConfig,
    cache: ResourceCache,
    queries: Queries,
    mutations: MutationController,
    sweeper: Option<SweeperHandle>,
}

impl FplClient {
    /// Connect to the service described by `config`
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let api = RealApiClient::new(&config)?;
        info!(base_url = api.base_url(), "Client configured");
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Build around any [`ApiClient`] implementation
    pub fn with_api(config: ClientConfig, api: Arc<dyn ApiClient>) -> Self {
        let cache = ResourceCache::new();
        let queries = Queries::new(cache.clone(), api.clone(), config.top_players_limit);
        let mutations = MutationController::new(cache.clone(), api);

        Self {
            config,
            cache,
            queries,
            mutations,
            sweeper: None,
        }
    }

    /// Start evicting idle entries every `sweep_interval`.
    ///
    /// Must be called inside a tokio runtime. The sweeper stops when the
    /// client is dropped.
    pub fn start_sweeper(&mut self) {
        if self.sweeper.is_none() {
            self.sweeper = Some(self.cache.spawn_sweeper(self.config.sweep_interval));
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    pub fn mutations(&self) -> &MutationController {
        &self.mutations
    }
}
