use crate::errors::AvatarError;
use crate::handlers::{fallback_redirect, image_response};
use crate::image_ops;
use crate::query::QueryOptions;
use crate::service::Body;
use crate::state::AppState;
use hyper::Response;
use identity::Fingerprint;

/// Serve the avatar behind an identity's federated handle.
///
/// The handle is resolved to an image URL through the profile API (cached),
/// the image is fetched with the shared error cache in front, and larger
/// images are downscaled preserving aspect; this path never upscales.
pub async fn handle(
    state: &AppState,
    digest: &str,
    query: Option<&str>,
) -> Result<Response<Body>, AvatarError> {
    let options = QueryOptions::from_query(query, &state.config.avatar);
    let size = options.size;
    let default = options.default.as_deref();

    let identity = match Fingerprint::parse(digest) {
        Some(fingerprint) => identity::resolve(state.store.as_ref(), &fingerprint)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("identity lookup failed: {e}");
                None
            }),
        None => None,
    };

    let Some(identity) = identity else {
        return Ok(fallback_redirect(digest, size, default));
    };
    let Some(handle) = identity.federated_handle else {
        return Ok(fallback_redirect(digest, size, default));
    };

    let Some(avatar_url) = state.federation.avatar_url(&handle).await else {
        return Ok(fallback_redirect(digest, size, default));
    };

    let Some(bytes) = state.federation.fetch_image(&avatar_url).await else {
        return Ok(fallback_redirect(digest, size, default));
    };

    match image_ops::downscale_to_fit(&bytes, size, state.config.avatar.jpeg_quality) {
        Ok((bytes, content_type)) => image_response(state, bytes.into(), content_type),
        Err(e) => {
            tracing::warn!(url = %avatar_url, "federated image did not transcode: {e}");
            Ok(fallback_redirect(digest, size, default))
        }
    }
}
