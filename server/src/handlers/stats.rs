use crate::errors::AvatarError;
use crate::service::Body;
use crate::state::AppState;
use http::header::CONTENT_TYPE;
use hyper::{Response, StatusCode};
use shared::http::full_body;

/// Instance-level counts as JSON.
pub async fn handle(state: &AppState) -> Result<Response<Body>, AvatarError> {
    let counts = state.store.counts().await?;
    let body = serde_json::to_vec(&counts)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(full_body(body))
        .map_err(|e| AvatarError::ResponseBuild(e.to_string()))
}
