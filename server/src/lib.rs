pub mod config;
pub mod errors;
mod federation;
pub mod handlers;
mod image_ops;
pub mod metrics_defs;
mod negative_cache;
pub mod query;
pub mod response_cache;
pub mod router;
pub mod service;
pub mod state;
pub mod trust;
mod upstream;

#[cfg(test)]
mod testutils;

pub use errors::AvatarError;

use identity::IdentityStore;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

/// Run the avatar service and its admin listener until one of them fails.
pub async fn run(config: config::Config, store: Arc<dyn IdentityStore>) -> Result<(), AvatarError> {
    let state = Arc::new(state::AppState::new(config.clone(), store)?);

    let avatar_task = run_http_service(
        &config.listener.host,
        config.listener.port,
        service::AvatarService::new(state),
    );
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, AvatarError>::new(|| true),
    );

    tokio::try_join!(avatar_task, admin_task)?;
    Ok(())
}
