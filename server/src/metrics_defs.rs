//! Metrics definitions for the avatar server.

use shared::metrics_defs::{MetricDef, MetricType};

pub const RESPONSE_CACHE_HIT: MetricDef = MetricDef {
    name: "response_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of requests answered from the response cache",
};

pub const RESPONSE_CACHE_MISS: MetricDef = MetricDef {
    name: "response_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of requests that missed the response cache",
};

pub const NEGATIVE_CACHE_HIT: MetricDef = MetricDef {
    name: "negative_cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of remote lookups short-circuited by a cached negative result",
};

pub const NEGATIVE_CACHE_MISS: MetricDef = MetricDef {
    name: "negative_cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of remote lookups that missed the negative caches",
};

pub const UPSTREAM_FETCH_OK: MetricDef = MetricDef {
    name: "upstream.fetch.ok",
    metric_type: MetricType::Counter,
    description: "Successful remote avatar fetches",
};

pub const UPSTREAM_FETCH_FAILED: MetricDef = MetricDef {
    name: "upstream.fetch.failed",
    metric_type: MetricType::Counter,
    description: "Remote avatar fetches that failed or timed out",
};

pub const AVATAR_GENERATED: MetricDef = MetricDef {
    name: "avatar.generated",
    metric_type: MetricType::Counter,
    description: "Avatars produced by a procedural backend",
};

pub const PHOTO_SERVED: MetricDef = MetricDef {
    name: "avatar.photo_served",
    metric_type: MetricType::Counter,
    description: "Uploaded photos served after transcoding",
};

pub const ALL_METRICS: &[MetricDef] = &[
    RESPONSE_CACHE_HIT,
    RESPONSE_CACHE_MISS,
    NEGATIVE_CACHE_HIT,
    NEGATIVE_CACHE_MISS,
    UPSTREAM_FETCH_OK,
    UPSTREAM_FETCH_FAILED,
    AVATAR_GENERATED,
    PHOTO_SERVED,
];
