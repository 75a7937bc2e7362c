//! Local tile server for pipeline tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

/// Path prefix the tile server mounts tiles under.
pub const IMAGE_PREFIX: &str = "/img/D531106";

struct ServerState {
    tiles: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

/// A running tile server. Serves the registered paths with `200 OK` and
/// answers everything else with `404`.
pub struct TileServer {
    pub base_url: String,
    state: Arc<ServerState>,
}

impl TileServer {
    /// Request paths in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }
}

/// Server path of tile `(x, y)` for a grid of `g` tiles per side.
pub fn tile_path(g: u32, resolution: u32, snapshot: &str, x: u32, y: u32) -> String {
    format!(
        "{}/{}d/{}/{}_{}_{}.png",
        IMAGE_PREFIX, g, resolution, snapshot, x, y
    )
}

async fn serve_tile(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(path.clone());

    if let Some(delay) = state.delays.get(&path) {
        tokio::time::sleep(*delay).await;
    }

    match state.tiles.get(&path) {
        Some(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            bytes.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn spawn_tile_server(tiles: HashMap<String, Vec<u8>>) -> TileServer {
    spawn_slow_tile_server(tiles, HashMap::new()).await
}

/// Like [`spawn_tile_server`], but holds the response for each path in
/// `delays` for the given time before answering.
pub async fn spawn_slow_tile_server(
    tiles: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
) -> TileServer {
    let state = Arc::new(ServerState {
        tiles,
        delays,
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .fallback(serve_tile)
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TileServer {
        base_url: format!("http://{}{}", addr, IMAGE_PREFIX),
        state,
    }
}
