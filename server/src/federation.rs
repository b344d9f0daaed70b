use crate::config::FederationConfig;
use crate::errors::AvatarError;
use crate::negative_cache::NegativeCache;
use hyper::body::Bytes;
use moka::sync::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
struct Profile {
    avatar: Option<String>,
}

/// Resolves a federated handle to its current avatar URL via the public
/// profile API and fetches the image itself. Resolved URLs are cached so
/// busy identities do not hit the profile API on every request; fetch
/// failures share the proxy's error cache.
pub struct FederationClient {
    client: reqwest::Client,
    profile_api_url: url::Url,
    avatar_urls: Cache<String, String>,
    error_cache: Arc<NegativeCache>,
}

impl FederationClient {
    pub fn new(
        config: &FederationConfig,
        error_cache: Arc<NegativeCache>,
    ) -> Result<Self, AvatarError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AvatarError::UpstreamClient(e.to_string()))?;

        let avatar_urls = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(config.avatar_url_ttl_secs))
            .build();

        Ok(FederationClient {
            client,
            profile_api_url: config.profile_api_url.clone(),
            avatar_urls,
            error_cache,
        })
    }

    pub async fn avatar_url(&self, handle: &str) -> Option<String> {
        if let Some(url) = self.avatar_urls.get(handle) {
            return Some(url);
        }

        let mut request_url = self.profile_api_url.clone();
        request_url
            .query_pairs_mut()
            .append_pair("actor", handle);

        let response = match self.client.get(request_url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(handle = %handle, status = %response.status(), "profile lookup failed");
                return None;
            }
            Err(e) => {
                tracing::warn!(handle = %handle, "profile lookup failed: {e}");
                return None;
            }
        };

        match response.json::<Profile>().await {
            Ok(Profile { avatar: Some(url) }) => {
                self.avatar_urls.insert(handle.to_string(), url.clone());
                Some(url)
            }
            Ok(Profile { avatar: None }) => None,
            Err(e) => {
                tracing::warn!(handle = %handle, "profile response did not parse: {e}");
                None
            }
        }
    }

    pub async fn fetch_image(&self, url: &str) -> Option<Bytes> {
        if self.error_cache.contains(url) {
            tracing::info!(url = %url, "cached federated fetch failure");
            return None;
        }

        let response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                if ![404, 503].contains(&response.status().as_u16()) {
                    tracing::warn!(
                        url = %url,
                        status = %response.status(),
                        "federated fetch failed with an unexpected HTTP status"
                    );
                }
                self.error_cache.insert(url);
                return None;
            }
            Err(e) => {
                tracing::warn!(url = %url, "federated fetch failed: {e}");
                self.error_cache.insert(url);
                return None;
            }
        };

        match response.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(url = %url, "federated fetch body failed: {e}");
                self.error_cache.insert(url);
                None
            }
        }
    }
}
