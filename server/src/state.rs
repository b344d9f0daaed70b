use crate::config::Config;
use crate::errors::AvatarError;
use crate::federation::FederationClient;
use crate::negative_cache::NegativeCache;
use crate::response_cache::ResponseCache;
use crate::trust::{TrustRule, normalize_rules};
use crate::upstream::GravatarClient;
use generators::GeneratorRegistry;
use identity::IdentityStore;
use std::sync::Arc;
use std::time::Duration;

/// Everything a request handler needs, shared across connections.
pub struct AppState {
    pub config: Config,
    /// Trust rules normalized from the configured list (legacy strings
    /// become url_prefix rules) so matching has one code path.
    pub trust_rules: Vec<TrustRule>,
    pub store: Arc<dyn IdentityStore>,
    pub generators: GeneratorRegistry,
    pub response_cache: ResponseCache,
    pub upstream: GravatarClient,
    pub federation: FederationClient,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn IdentityStore>) -> Result<Self, AvatarError> {
        // Fetch failures from the remote proxy and the federation client
        // share one error cache; the probe cache lives in the upstream
        // client with its own TTL.
        let error_cache = Arc::new(NegativeCache::new(Duration::from_secs(
            config.upstream.error_negative_ttl_secs,
        )));

        let upstream = GravatarClient::new(&config.upstream, error_cache.clone())?;
        let federation = FederationClient::new(&config.federation, error_cache)?;
        let response_cache = ResponseCache::new(&config.response_cache);
        let trust_rules = normalize_rules(&config.trusted_default_urls);

        Ok(AppState {
            config,
            trust_rules,
            store,
            generators: GeneratorRegistry::with_builtins(),
            response_cache,
            upstream,
            federation,
        })
    }
}
