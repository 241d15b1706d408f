// src/test_utils/mock_release_server.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockServerState {
    release_status: u16,
    release_body: Arc<String>,
    files: Arc<HashMap<String, Vec<u8>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn latest_release_handler(State(state): State<MockServerState>) -> impl IntoResponse {
    state.requests.lock().unwrap().push("/releases/latest".to_string());
    let status =
        StatusCode::from_u16(state.release_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = state.release_body.as_ref().clone();
    (status, [("content-type", "application/json")], body)
}

async fn download_handler(
    State(state): State<MockServerState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(format!("/download/{}", name));
    match state.files.get(&name) {
        Some(bytes) => (StatusCode::OK, bytes.clone()),
        None => (StatusCode::NOT_FOUND, b"<html>Not Found</html>".to_vec()),
    }
}

/// Local HTTP server imitating a GitHub "latest release" endpoint
pub struct MockReleaseServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockReleaseServer {
    /// Serve `assets` (name, bytes) in the given order from a 200 release response
    pub async fn start(assets: Vec<(&str, Vec<u8>)>) -> Self {
        Self::start_with(200, assets, Vec::new()).await
    }

    /// `extra_files` are downloadable but not listed in the release
    pub async fn start_with(
        release_status: u16,
        assets: Vec<(&str, Vec<u8>)>,
        extra_files: Vec<(&str, Vec<u8>)>,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        let base = format!("http://{}", addr);

        let asset_json: Vec<_> = assets
            .iter()
            .map(|(name, bytes)| {
                json!({
                    "name": name,
                    "size": bytes.len(),
                    "browser_download_url": format!("{}/download/{}", base, name),
                })
            })
            .collect();
        let release = if release_status == 200 {
            json!({ "tag_name": "v0.6.5", "name": "v0.6.5", "assets": asset_json })
        } else {
            json!({ "message": "API rate limit exceeded" })
        };

        let state = MockServerState {
            release_status,
            release_body: Arc::new(release.to_string()),
            files: Arc::new(
                assets
                    .into_iter()
                    .chain(extra_files)
                    .map(|(name, bytes)| (name.to_string(), bytes))
                    .collect(),
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/releases/latest", get(latest_release_handler))
            .route("/download/{name}", get(download_handler))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| log::error!("Mock release server error: {}", e));
        });

        Self {
            addr,
            shutdown_tx,
            requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL of the download route
    pub fn download_base(&self) -> String {
        format!("{}/download", self.address())
    }

    pub fn feed_url(&self) -> String {
        format!("{}/releases/latest", self.address())
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}
