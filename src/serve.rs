//! Static HTTP server for browsing a downloaded tile tree offline.
//!
//! Files are served from a root directory whose `tiles/` folder holds the
//! [`TileStore`](crate::TileStore). Missing tiles are answered with a
//! transparent placeholder so map libraries don't render broken images.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::{future::Future, net::SocketAddr, path::PathBuf};
use tokio::{fs, net::TcpListener};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};
use tracing::{debug, info};

use crate::error::Result;
use crate::source::TileSource;
use crate::store::TileStore;

pub const DEFAULT_PORT: u16 = 8000;

/// Directory below the server root that holds the tile store.
pub const TILES_DIR: &str = "tiles";

/// A fully transparent 1×1 RGBA PNG.
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

/// Serves `root` on `addr` until `shutdown` resolves.
///
/// Creates the per-source tile directories below `root/tiles` first.
pub async fn serve(
    root: PathBuf,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let store = TileStore::new(root.join(TILES_DIR));
    for source in TileSource::ALL {
        fs::create_dir_all(store.source_dir(source)).await?;
    }

    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        root = %root.display(),
        "serving tiles"
    );

    axum::serve(listener, router(root))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("server stopped");
    Ok(())
}

/// The server's routes: static files below `root` with the tile placeholder,
/// preflight answers and the CORS and no-cache headers on top.
pub fn router(root: PathBuf) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(middleware::from_fn(handle))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
}

async fn handle(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else if escapes_root(&path) {
        (StatusCode::BAD_REQUEST, "invalid path").into_response()
    } else {
        let response = next.run(req).await;
        if response.status() == StatusCode::NOT_FOUND && is_tile_request(&path) {
            debug!(path = %path, "tile missing, sending placeholder");
            placeholder()
        } else {
            response
        }
    };

    info!(%method, path = %path, status = response.status().as_u16(), "request");
    response
}

fn placeholder() -> Response {
    (
        [(header::CONTENT_TYPE, "image/png")],
        Body::from(PLACEHOLDER_PNG),
    )
        .into_response()
}

fn is_tile_request(path: &str) -> bool {
    path.contains(&format!("/{}/", TILES_DIR))
}

// Encoded parent segments are rejected by `ServeDir` itself.
fn escapes_root(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}
