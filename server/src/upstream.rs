use crate::config::UpstreamConfig;
use crate::errors::AvatarError;
use crate::image_ops;
use crate::metrics_defs::{UPSTREAM_FETCH_FAILED, UPSTREAM_FETCH_OK};
use crate::negative_cache::NegativeCache;
use hyper::body::Bytes;
use shared::counter;
use std::sync::Arc;
use std::time::Duration;

/// Probe requests use a small fixed size; the sentinel default makes the
/// remote answer 404 where it would otherwise serve its own default image.
const PROBE_SIZE: u32 = 50;
const PROBE_NOT_FOUND_SENTINEL: &str = "404";

pub enum ProbeOutcome {
    /// The remote has a real avatar for this digest.
    HasAvatar,
    /// The remote would serve its default image; fall back locally.
    OnlyDefault,
    /// The probe itself failed; fall back locally without caching.
    Failed,
}

pub enum FetchOutcome {
    Image {
        bytes: Bytes,
        content_type: &'static str,
    },
    Fallback,
}

enum FetchFailure {
    Status(u16),
    Transport(String),
}

/// Client for the remote federated-avatar service. Negative results are
/// remembered in two URL-keyed caches with separate TTLs: probe results
/// ("only the default there") and fetch failures.
pub struct GravatarClient {
    client: reqwest::Client,
    base_url: String,
    probe_cache: NegativeCache,
    error_cache: Arc<NegativeCache>,
}

impl GravatarClient {
    pub fn new(
        config: &UpstreamConfig,
        error_cache: Arc<NegativeCache>,
    ) -> Result<Self, AvatarError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AvatarError::UpstreamClient(e.to_string()))?;

        let mut base_url = config.base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(GravatarClient {
            client,
            base_url,
            probe_cache: NegativeCache::new(Duration::from_secs(config.probe_negative_ttl_secs)),
            error_cache,
        })
    }

    /// Remote avatar URL for a digest; also the target of
    /// `gravatarredirect` responses.
    pub fn avatar_url(&self, digest: &str, size: u32, default: Option<&str>) -> String {
        let mut url = format!("{}avatar/{digest}?s={size}", self.base_url);
        if let Some(default) = default {
            url.push_str(&format!("&d={default}"));
        }
        url
    }

    /// First stage of proxying: ask the remote whether it has anything
    /// beyond its own default for this digest.
    pub async fn probe(&self, digest: &str) -> ProbeOutcome {
        let probe_url = self.avatar_url(digest, PROBE_SIZE, Some(PROBE_NOT_FOUND_SENTINEL));

        if self.probe_cache.contains(&probe_url) {
            return ProbeOutcome::OnlyDefault;
        }

        match self.client.get(&probe_url).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::HasAvatar,
            Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                self.probe_cache.insert(&probe_url);
                ProbeOutcome::OnlyDefault
            }
            Ok(response) => {
                tracing::warn!(url = %probe_url, status = %response.status(), "gravatar probe failed");
                ProbeOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(url = %probe_url, "gravatar probe failed: {e}");
                ProbeOutcome::Failed
            }
        }
    }

    /// Second stage: the real-size fetch. Timeouts, transport errors and
    /// HTTP errors all land in the error cache and fall back locally; a
    /// payload that does not decode as an image falls back too.
    pub async fn fetch(&self, digest: &str, size: u32, default: Option<&str>) -> FetchOutcome {
        let url = self.avatar_url(digest, size, default);

        if self.error_cache.contains(&url) {
            tracing::info!(url = %url, "cached gravatar fetch failure");
            return FetchOutcome::Fallback;
        }

        let bytes = match self.get_bytes(&url).await {
            Ok(bytes) => bytes,
            Err(failure) => {
                match failure {
                    FetchFailure::Status(status) => {
                        if status != 404 && status != 503 {
                            tracing::warn!(
                                url = %url,
                                status,
                                "gravatar fetch failed with an unexpected HTTP status"
                            );
                        }
                    }
                    FetchFailure::Transport(reason) => {
                        tracing::warn!(url = %url, "gravatar fetch failed: {reason}");
                    }
                }
                self.error_cache.insert(&url);
                counter!(UPSTREAM_FETCH_FAILED).increment(1);
                return FetchOutcome::Fallback;
            }
        };

        match image_ops::sniff_image(&bytes) {
            Some(format) => {
                counter!(UPSTREAM_FETCH_OK).increment(1);
                FetchOutcome::Image {
                    bytes,
                    content_type: format.content_type(),
                }
            }
            None => {
                tracing::warn!(url = %url, "gravatar payload does not decode as an image");
                FetchOutcome::Fallback
            }
        }
    }

    async fn get_bytes(&self, url: &str) -> Result<Bytes, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))
    }
}
