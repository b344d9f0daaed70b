use crate::config::ResponseCacheConfig;
use crate::metrics_defs::{RESPONSE_CACHE_HIT, RESPONSE_CACHE_MISS};
use hyper::body::Bytes;
use moka::sync::Cache;
use shared::counter;
use std::time::Duration;

/// A rendered response ready to replay: generator and proxy output is
/// deterministic per URI, so the exact request URI is the whole key.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

/// URI-keyed store for rendered avatar bytes. Storage TTL is independent
/// of the Cache-Control max-age sent to clients; conflating the two is how
/// TTL bugs happen.
pub struct ResponseCache {
    cache: Cache<String, CachedResponse>,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(config: &ResponseCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        ResponseCache {
            cache,
            enabled: config.enabled,
        }
    }

    pub fn get(&self, uri: &str) -> Option<CachedResponse> {
        if !self.enabled {
            return None;
        }
        let entry = self.cache.get(uri);
        let metric_def = if entry.is_some() {
            RESPONSE_CACHE_HIT
        } else {
            RESPONSE_CACHE_MISS
        };
        counter!(metric_def).increment(1);
        entry
    }

    pub fn insert(&self, uri: &str, response: CachedResponse) {
        if !self.enabled {
            return;
        }
        self.cache.insert(uri.to_string(), response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CachedResponse {
        CachedResponse {
            status: 200,
            content_type: "image/png".to_string(),
            body: Bytes::from_static(b"pixels"),
        }
    }

    #[test]
    fn test_round_trip() {
        let cache = ResponseCache::new(&ResponseCacheConfig::default());
        assert_eq!(cache.get("/avatar/abc?s=80"), None);

        cache.insert("/avatar/abc?s=80", entry());
        assert_eq!(cache.get("/avatar/abc?s=80"), Some(entry()));
        // a different query string is a different key
        assert_eq!(cache.get("/avatar/abc?s=81"), None);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let config = ResponseCacheConfig {
            enabled: false,
            ..ResponseCacheConfig::default()
        };
        let cache = ResponseCache::new(&config);
        cache.insert("/avatar/abc", entry());
        assert_eq!(cache.get("/avatar/abc"), None);
    }
}
