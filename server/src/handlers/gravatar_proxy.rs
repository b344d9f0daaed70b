use crate::errors::AvatarError;
use crate::handlers::{cached_image_response, fallback_redirect, replay_cached_response};
use crate::query::QueryOptions;
use crate::service::Body;
use crate::state::AppState;
use crate::upstream::{FetchOutcome, ProbeOutcome};
use hyper::Response;

/// Proxy a request through to the remote federated-avatar service.
///
/// The probe stage asks the remote whether it has anything beyond its own
/// default for this digest; it is skipped entirely for `wavatar`, which
/// always composes from the remote's default image. Every failure mode
/// redirects back to the avatar view with the fallback chain forced.
pub async fn handle(
    state: &AppState,
    digest: &str,
    query: Option<&str>,
    uri: &str,
) -> Result<Response<Body>, AvatarError> {
    if let Some(entry) = state.response_cache.get(uri) {
        return replay_cached_response(state, entry);
    }

    let options = QueryOptions::from_query(query, &state.config.avatar);
    let size = options.size;
    let default = options.default.as_deref();

    if default != Some("wavatar") {
        match state.upstream.probe(digest).await {
            ProbeOutcome::HasAvatar => {}
            ProbeOutcome::OnlyDefault | ProbeOutcome::Failed => {
                return Ok(fallback_redirect(digest, size, default));
            }
        }
    }

    match state.upstream.fetch(digest, size, default).await {
        FetchOutcome::Image {
            bytes,
            content_type,
        } => cached_image_response(state, uri, bytes.to_vec(), content_type),
        FetchOutcome::Fallback => Ok(fallback_redirect(digest, size, default)),
    }
}
