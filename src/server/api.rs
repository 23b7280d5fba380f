use crate::models::relay::{ RelayRequest, RelayResponse };
use crate::relay::{ Relay, RelayError };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::post,
    Router,
    Json,
    extract::{ State, rejection::JsonRejection },
};
use serde_json::Value as JsonValue;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn };

pub fn router(relay: Arc<Relay>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(chat_handler))
        .layer(cors)
        .with_state(relay)
}

pub async fn start_http_server(
    addr: SocketAddr,
    relay: Arc<Relay>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(relay);
    let listener = tokio::net::TcpListener::bind(addr).await
        .map_err(|e| format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e))?;
    info!("Relay listening on: http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub async fn start_https_server(
    addr: SocketAddr,
    relay: Arc<Relay>,
    cert_path: &str,
    key_path: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(relay);
    let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
        cert_path,
        key_path
    ).await
        .map_err(|e| format!("Failed to load TLS certificate '{}' / key '{}': {}", cert_path, key_path, e))?;

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!("Relay listening on: https://{}", addr);
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn chat_handler(
    State(relay): State<Arc<Relay>>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<Json<RelayResponse>, RelayError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        RelayError::InvalidBody(rejection.body_text())
    })?;

    let request = RelayRequest::from_json(&body).ok_or(RelayError::MissingMessage)?;
    info!("Relaying message ({} chars, {} history turns)", request.message.len(), request.history.len());

    let message = relay.reply(&request).await?;
    Ok(Json(RelayResponse::Message { message }))
}
