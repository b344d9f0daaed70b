use crate::errors::AvatarError;
use crate::handlers::{cached_image_response, image_response, replay_cached_response, static_assets};
use crate::image_ops;
use crate::metrics_defs::{AVATAR_GENERATED, PHOTO_SERVED};
use crate::query::QueryOptions;
use crate::service::Body;
use crate::state::AppState;
use crate::trust::is_trusted_url;
use http::header::{ALLOW, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use identity::{Fingerprint, Identity, Photo};
use shared::counter;
use shared::http::{full_body, make_redirect_response};

/// The `default` backends the avatar endpoint understands, as advertised
/// on OPTIONS.
const SUPPORTED_DEFAULTS: &str = "404 mm mp retro pagan wavatar monsterid robohash identicon";

pub fn options_response() -> Result<Response<Body>, AvatarError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, SUPPORTED_DEFAULTS)
        .body(full_body(""))
        .map_err(|e| AvatarError::ResponseBuild(e.to_string()))
}

/// The resolution pipeline: response cache, identity lookup, direct photo
/// serve, then the fallback chain. Nothing on this path errors toward the
/// client; unusable input degrades into the fallback chain.
pub async fn handle(
    state: &AppState,
    digest: &str,
    query: Option<&str>,
    uri: &str,
) -> Result<Response<Body>, AvatarError> {
    // CacheCheck: an exact-URI hit short-circuits everything else
    if let Some(entry) = state.response_cache.get(uri) {
        return replay_cached_response(state, entry);
    }

    let options = QueryOptions::from_query(query, &state.config.avatar);

    // An absolute URL in `default` must clear the trust filter; untrusted
    // entries are dropped as if no default had been supplied.
    let mut default = options.default.clone();
    if let Some(candidate) = &default
        && candidate.contains("://")
        && !is_trusted_url(candidate, &state.trust_rules)
    {
        tracing::info!(url = %candidate, "default URL is not trusted, dropping it");
        default = None;
    }

    // IdentityLookup: a malformed digest is a miss, not an error; a store
    // failure degrades the same way.
    let identity = match Fingerprint::parse(digest) {
        Some(fingerprint) => identity::resolve(state.store.as_ref(), &fingerprint)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("identity lookup failed: {e}");
                None
            }),
        None => None,
    };

    // A federated handle substitutes for a photo and takes precedence
    if let Some(identity) = &identity
        && identity.federated_handle.is_some()
    {
        return Ok(make_redirect_response(&format!("/externalproxy/{digest}")));
    }

    // DirectServe only applies when the identity has a photo on record and
    // the caller did not force the fallback chain
    if let Some(identity) = identity
        && !options.forcedefault
        && let Some(photo_id) = identity.photo
    {
        let photo = state.store.photo(photo_id).await.unwrap_or_else(|e| {
            tracing::warn!("photo load failed: {e}");
            None
        });
        if let Some(photo) = photo {
            match serve_photo(state, &identity, &photo, options.size).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    // Stored bytes that no longer decode route to the
                    // fallback chain like any other miss
                    tracing::warn!(photo = photo.id, "photo transcode failed: {e}");
                }
            }
        }
    }

    fallback_chain(state, digest, &options, default, uri).await
}

async fn serve_photo(
    state: &AppState,
    identity: &Identity,
    photo: &Photo,
    size: u32,
) -> Result<Response<Body>, AvatarError> {
    let (bytes, content_type) =
        image_ops::transcode_photo(photo, size, state.config.avatar.jpeg_quality)?;

    if let Err(e) = state.store.record_access(identity.id, photo.id).await {
        tracing::warn!("access counter update failed: {e}");
    }
    counter!(PHOTO_SERVED).increment(1);

    image_response(state, bytes.into(), content_type)
}

/// Fallback precedence: remote redirect, local proxy, explicit default
/// (generator / static / 404 / trusted URL), then the generic placeholder.
async fn fallback_chain(
    state: &AppState,
    digest: &str,
    options: &QueryOptions,
    default: Option<String>,
    uri: &str,
) -> Result<Response<Body>, AvatarError> {
    let size = options.size;

    if options.gravatarredirect && !options.forcedefault {
        let url = state.upstream.avatar_url(digest, size, None);
        return Ok(make_redirect_response(&url));
    }

    if options.gravatarproxy && !options.forcedefault {
        let mut url = format!("/gravatarproxy/{digest}?s={size}");
        if let Some(default) = &default {
            url.push_str(&format!("&default={default}"));
        }
        return Ok(make_redirect_response(&url));
    }

    if let Some(default) = default {
        // wavatar always composes remotely from the upstream's default
        // image, so it re-enters the proxy even when forced
        if default == "wavatar" {
            return Ok(make_redirect_response(&format!(
                "/gravatarproxy/{digest}?s={size}&default=wavatar&f=y"
            )));
        }

        if default == "404" {
            return Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header(CONTENT_TYPE, "text/html; charset=utf-8")
                .body(full_body("<h1>Image not found</h1>"))
                .map_err(|e| AvatarError::ResponseBuild(e.to_string()));
        }

        if default == "mm" || default == "mp" {
            return Ok(static_assets::redirect(&state.config.static_assets, "mm", size));
        }

        if let Some(generator) = state.generators.get(&default) {
            let image = generator.generate(digest, size);
            let bytes = encode_generated(&image)?;
            counter!(AVATAR_GENERATED).increment(1);
            return cached_image_response(state, uri, bytes, "image/png");
        }

        if default.contains("://") {
            // Already trust-validated above
            return Ok(make_redirect_response(&default));
        }

        // Unrecognized keyword: fall through to the generic placeholder
        tracing::info!(default = %default, "unrecognized default keyword");
    }

    Ok(static_assets::redirect(
        &state.config.static_assets,
        "nobody",
        size,
    ))
}

fn encode_generated(image: &image::RgbaImage) -> Result<Vec<u8>, AvatarError> {
    generators::encode_png(image).map_err(|e| AvatarError::ImageEncode(e.to_string()))
}
