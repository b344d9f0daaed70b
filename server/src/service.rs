use crate::errors::AvatarError;
use crate::handlers::{avatar, external_proxy, gravatar_proxy, stats};
use crate::router::{Route, match_route};
use crate::state::AppState;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service as HyperService;
use hyper::{Request, Response, StatusCode};
use shared::http::{make_error_response, make_redirect_response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type Body = BoxBody<Bytes, AvatarError>;

/// The main listener's service: routes each request to its handler and
/// turns any leftover internal error into a 500 so a request can never
/// take the process down.
#[derive(Clone)]
pub struct AvatarService {
    state: Arc<AppState>,
}

impl AvatarService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl HyperService<Request<Incoming>> for AvatarService {
    type Response = Response<Body>;
    type Error = AvatarError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = self.state.clone();
        // The request body is never read; keep only method and URI
        let method = req.method().clone();
        let uri = req.uri().clone();

        Box::pin(async move {
            match dispatch(&state, &method, &uri).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    tracing::error!(path = %uri.path(), "request failed: {e}");
                    Ok(make_error_response(StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        })
    }
}

async fn dispatch(
    state: &AppState,
    method: &hyper::Method,
    uri: &hyper::Uri,
) -> Result<Response<Body>, AvatarError> {
    let query = uri.query();
    // The response cache is keyed by the exact request URI
    let cache_key = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    match match_route(method, uri.path()) {
        Route::Avatar { digest } => avatar::handle(state, &digest, query, cache_key).await,
        Route::AvatarOptions => avatar::options_response(),
        Route::AvatarBare => Ok(make_redirect_response("/")),
        Route::GravatarProxy { digest } => {
            gravatar_proxy::handle(state, &digest, query, cache_key).await
        }
        Route::ExternalProxy { digest } => external_proxy::handle(state, &digest, query).await,
        Route::Stats => stats::handle(state).await,
        Route::MethodNotAllowed => Ok(make_error_response(StatusCode::METHOD_NOT_ALLOWED)),
        Route::NotFound => Ok(make_error_response(StatusCode::NOT_FOUND)),
    }
}
