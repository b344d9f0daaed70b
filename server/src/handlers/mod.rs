pub mod avatar;
pub mod external_proxy;
pub mod gravatar_proxy;
pub mod static_assets;
pub mod stats;

use crate::errors::AvatarError;
use crate::response_cache::CachedResponse;
use crate::service::Body;
use crate::state::AppState;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use shared::http::{full_body, make_redirect_response};

/// Image response with the client-facing cache lifetime. This max-age is
/// deliberately independent of the response cache's storage TTL.
pub(crate) fn image_response(
    state: &AppState,
    bytes: Bytes,
    content_type: &str,
) -> Result<Response<Body>, AvatarError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(
            CACHE_CONTROL,
            format!("max-age={}", state.config.response_cache.image_max_age_secs),
        )
        .body(full_body(bytes))
        .map_err(|e| AvatarError::ResponseBuild(e.to_string()))
}

/// Serve image bytes and write them through the response cache. Only
/// generator- and proxy-produced bytes come through here; photo serves
/// must stay uncached so their access counters move on every request.
pub(crate) fn cached_image_response(
    state: &AppState,
    uri: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<Response<Body>, AvatarError> {
    let bytes = Bytes::from(bytes);
    state.response_cache.insert(
        uri,
        CachedResponse {
            status: 200,
            content_type: content_type.to_string(),
            body: bytes.clone(),
        },
    );
    image_response(state, bytes, content_type)
}

pub(crate) fn replay_cached_response(
    state: &AppState,
    entry: CachedResponse,
) -> Result<Response<Body>, AvatarError> {
    let mut builder = Response::builder()
        .status(entry.status)
        .header(CONTENT_TYPE, entry.content_type.as_str());
    if entry.status == 200 {
        builder = builder.header(
            CACHE_CONTROL,
            format!("max-age={}", state.config.response_cache.image_max_age_secs),
        );
    }
    builder
        .body(full_body(entry.body))
        .map_err(|e| AvatarError::ResponseBuild(e.to_string()))
}

/// Redirect back into the avatar view with the fallback chain forced,
/// carrying the caller's original default selection unchanged.
pub(crate) fn fallback_redirect(
    digest: &str,
    size: u32,
    default: Option<&str>,
) -> Response<Body> {
    let mut url = format!("/avatar/{digest}?s={size}&forcedefault=y");
    if let Some(default) = default {
        url.push_str(&format!("&default={default}"));
    }
    make_redirect_response(&url)
}
