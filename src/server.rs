use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config, error::ConfigError, types::PkceToken};

/// Serves `/callback` and `/health` until the process ends.
pub async fn start_api_server(state: Arc<Mutex<Option<PkceToken>>>) -> crate::Res<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let address = config::server_addr();
    let addr = SocketAddr::from_str(&address)
        .map_err(|source| ConfigError::InvalidAddress { address, source })?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::debug!(%addr, "callback server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
