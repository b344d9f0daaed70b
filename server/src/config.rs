use crate::trust::TrustedUrlRule;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Upstream base URL must be http or https, got: {0}")]
    InvalidUpstreamScheme(String),

    #[error("default_size ({0}) cannot exceed max_size ({1})")]
    DefaultSizeTooLarge(u32, u32),

    #[error("max_size cannot be 0")]
    ZeroMaxSize,

    #[error("default_size cannot be 0")]
    ZeroDefaultSize,

    #[error("jpeg_quality must be 1..=100, got: {0}")]
    InvalidJpegQuality(u8),

    #[error("static_assets.sizes cannot be empty")]
    NoStaticSizes,
}

/// Server configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for avatar traffic
    pub listener: Listener,
    /// Admin listener for health/readiness probes
    pub admin_listener: Listener,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub response_cache: ResponseCacheConfig,
    #[serde(default)]
    pub static_assets: StaticAssetsConfig,
    #[serde(default)]
    pub federation: FederationConfig,
    /// Allow-list for caller-supplied `default` redirect URLs. Entries are
    /// either full rule records or legacy bare prefix strings.
    #[serde(default)]
    pub trusted_default_urls: Vec<TrustedUrlRule>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        match self.upstream.base_url.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::InvalidUpstreamScheme(other.to_string())),
        }

        if self.avatar.max_size == 0 {
            return Err(ValidationError::ZeroMaxSize);
        }
        if self.avatar.default_size == 0 {
            return Err(ValidationError::ZeroDefaultSize);
        }
        if self.avatar.default_size > self.avatar.max_size {
            return Err(ValidationError::DefaultSizeTooLarge(
                self.avatar.default_size,
                self.avatar.max_size,
            ));
        }
        if self.avatar.jpeg_quality == 0 || self.avatar.jpeg_quality > 100 {
            return Err(ValidationError::InvalidJpegQuality(self.avatar.jpeg_quality));
        }
        if self.static_assets.sizes.is_empty() {
            return Err(ValidationError::NoStaticSizes);
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Size and quality bounds for served images
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AvatarConfig {
    /// Size used when the request carries none (or an unusable one)
    pub default_size: u32,
    /// Hard ceiling a requested size is clamped to
    pub max_size: u32,
    pub jpeg_quality: u8,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        AvatarConfig {
            default_size: 80,
            max_size: 512,
            jpeg_quality: 85,
        }
    }
}

/// Remote federated-avatar service ("Gravatar-compatible") settings
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: Url,
    /// Applies to the whole request/response cycle of each remote call
    pub timeout_secs: u64,
    /// How long a "remote only has its default" probe result is remembered
    pub probe_negative_ttl_secs: u64,
    /// How long a failed remote fetch is remembered
    pub error_negative_ttl_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            // The url crate cannot fail on this literal
            base_url: Url::parse("https://secure.gravatar.com/").expect("static url"),
            timeout_secs: 10,
            probe_negative_ttl_secs: 60,
            error_negative_ttl_secs: 30,
        }
    }
}

/// Response cache settings. `ttl_secs` bounds how long rendered bytes stay
/// in the store; `image_max_age_secs` is the distinct client-facing
/// Cache-Control lifetime on image responses.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResponseCacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub max_entries: u64,
    pub image_max_age_secs: u64,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        ResponseCacheConfig {
            enabled: true,
            ttl_secs: 900,
            max_entries: 4096,
            image_max_age_secs: 300,
        }
    }
}

/// Where the fixed placeholder images live and which sizes exist there
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StaticAssetsConfig {
    pub url_prefix: String,
    pub sizes: Vec<u32>,
}

impl Default for StaticAssetsConfig {
    fn default() -> Self {
        StaticAssetsConfig {
            url_prefix: "/static/img".to_string(),
            sizes: vec![80, 128, 256, 512],
        }
    }
}

/// Profile API used to turn a federated handle into an avatar URL
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FederationConfig {
    pub profile_api_url: Url,
    pub timeout_secs: u64,
    /// How long a resolved handle-to-avatar-URL mapping is kept
    pub avatar_url_ttl_secs: u64,
}

impl Default for FederationConfig {
    fn default() -> Self {
        FederationConfig {
            profile_api_url: Url::parse(
                "https://public.api.bsky.app/xrpc/app.bsky.actor.getProfile",
            )
            .expect("static url"),
            timeout_secs: 10,
            avatar_url_ttl_secs: 300,
        }
    }
}
