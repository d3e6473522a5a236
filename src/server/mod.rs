//! Development server with live reload
//!
//! `/blog` and `/blog/:slug` are rendered from the in-memory collection so a
//! hidden or unknown post always answers 404. Everything else comes from the
//! public directory.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path as UrlPath, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::PostCollection;
use crate::generator::Generator;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
pub struct ServerState {
    site: Site,
    generator: Generator,
    /// Replaced wholesale after every successful rebuild
    collection: RwLock<PostCollection>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    pub fn new(site: &Site, collection: PostCollection, live_reload: bool) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            site: site.clone(),
            generator: Generator::new(site)?,
            collection: RwLock::new(collection),
            reload_tx,
            live_reload,
        })
    }

    /// Swap in a freshly built collection and tell browsers to reload
    pub async fn replace_collection(&self, collection: PostCollection) {
        *self.collection.write().await = collection;
        let _ = self.reload_tx.send(());
    }
}

/// Routes of the dev server
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/blog", get(listing_handler))
        .route("/blog/", get(listing_handler))
        .route("/blog/:slug", get(post_handler))
        .route("/blog/:slug/", get(post_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(
    site: &Site,
    collection: PostCollection,
    ip: &str,
    port: u16,
    watch: bool,
    open: bool,
) -> Result<()> {
    let state = Arc::new(ServerState::new(site, collection, watch)?);
    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}/blog", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let handle = tokio::runtime::Handle::current();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_rebuild(state, handle) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the content directory, rebuilding on change
fn watch_and_rebuild(state: Arc<ServerState>, handle: tokio::runtime::Handle) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let content_dir = &state.site.content_dir;
    if content_dir.exists() {
        debouncer
            .watcher()
            .watch(content_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", content_dir);
    }

    // Routes and the generator hold the startup config
    if state.site.base_dir.join("_config.yml").exists() {
        tracing::info!("Changes to _config.yml apply after a server restart");
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events.iter().filter(|e| is_relevant(&e.path)).collect();
                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                tracing::info!("Rebuilding...");
                match state.site.build() {
                    Ok(collection) => {
                        handle.block_on(state.replace_collection(collection));
                        tracing::info!("Rebuilt successfully");
                    }
                    // keep serving the last good build
                    Err(e) => tracing::error!("Build failed: {:#}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Editor droppings and VCS files never trigger a rebuild
fn is_relevant(path: &std::path::Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}

async fn listing_handler(State(state): State<Arc<ServerState>>) -> Response {
    let collection = state.collection.read().await;
    let page = state.generator.render_listing(&collection);
    html_response(&state, StatusCode::OK, page)
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    UrlPath(slug): UrlPath<String>,
) -> Response {
    let collection = state.collection.read().await;
    match collection.find_published(&slug) {
        Some(post) => {
            let page = state.generator.render_post(&collection, post);
            html_response(&state, StatusCode::OK, page)
        }
        None => {
            tracing::debug!("No published post {:?}", slug);
            not_found(&state)
        }
    }
}

fn not_found(state: &ServerState) -> Response {
    html_response(state, StatusCode::NOT_FOUND, state.generator.render_not_found())
}

fn html_response(state: &ServerState, status: StatusCode, page: Result<String>) -> Response {
    match page {
        Ok(html) => {
            let html = if state.live_reload {
                inject_live_reload(&html)
            } else {
                html
            };
            (status, Html(html)).into_response()
        }
        Err(e) => {
            tracing::error!("Render failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Render error").into_response()
        }
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve the public directory, injecting live reload into HTML pages
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let public_dir = &state.site.public_dir;
    let path = percent_decode_str(request.uri().path())
        .decode_utf8_lossy()
        .to_string();

    if state.live_reload {
        if let Some(file_path) = html_file(public_dir, &path) {
            if let Ok(content) = tokio::fs::read_to_string(&file_path).await {
                return Html(inject_live_reload(&content)).into_response();
            }
        }
    }

    let mut service = ServeDir::new(public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// HTML file under `public_dir` a request path maps to, if any
fn html_file(public_dir: &std::path::Path, path: &str) -> Option<PathBuf> {
    let clean_path = path.trim_start_matches('/');
    if clean_path.split('/').any(|part| part == "..") {
        return None;
    }

    let candidate = public_dir.join(clean_path);
    let file_path = if candidate.is_dir() {
        candidate.join("index.html")
    } else if candidate.is_file() {
        candidate
    } else {
        public_dir.join(format!("{}.html", clean_path))
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    (is_html && file_path.is_file()).then_some(file_path)
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
