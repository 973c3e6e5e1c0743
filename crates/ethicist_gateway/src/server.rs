use crate::types::{MessageQuery, SessionInfo};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use ethicist_mcp::{JsonRpcResponse, McpServer};
use futures_util::stream::{self, Stream, StreamExt};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

type Sessions = Arc<RwLock<HashMap<Uuid, mpsc::Sender<JsonRpcResponse>>>>;

#[derive(Clone)]
struct AppState {
    server: McpServer,
    /// Open SSE streams, keyed by session id.
    sessions: Sessions,
}

/// MCP over HTTP.
///
/// - `GET /sse` opens an event stream; its first `endpoint` event names the
///   session's POST URL
/// - `POST /messages?session_id=` accepts a JSON-RPC message, answered on the stream
/// - `POST /mcp` answers a JSON-RPC message in the HTTP body
/// - `GET /health` health check
pub struct GatewayServer {
    server: McpServer,
    sessions: Sessions,
    host: String,
    port: u16,
}

impl GatewayServer {
    pub fn new(server: McpServer, host: &str, port: u16) -> Self {
        Self {
            server,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            host: host.to_string(),
            port,
        }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            server: self.server.clone(),
            sessions: self.sessions.clone(),
        };
        Router::new()
            .route("/health", get(health))
            .route("/sse", get(open_stream))
            .route("/messages", post(post_message))
            .route("/mcp", post(post_mcp))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Gateway failed to bind {}: {}", addr, e))?;
        tracing::info!("Gateway listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// Removes its session when the SSE stream is dropped (client went away).
struct SessionGuard {
    id: Uuid,
    sessions: Sessions,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let sessions = self.sessions.clone();
        let id = self.id;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                sessions.write().await.remove(&id);
                tracing::info!(session = %id, "SSE session closed");
            });
        }
    }
}

/// GET /sse
async fn open_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let info = SessionInfo::new();
    let (tx, rx) = mpsc::channel::<JsonRpcResponse>(32);
    state.sessions.write().await.insert(info.session_id, tx);
    tracing::info!(session = %info.session_id, "SSE session opened");

    let guard = SessionGuard {
        id: info.session_id,
        sessions: state.sessions.clone(),
    };

    let endpoint = Event::default().event("endpoint").data(info.endpoint());
    let first = stream::once(async move { Ok::<_, Infallible>(endpoint) });
    let responses = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let response = rx.recv().await?;
        let event = match serde_json::to_string(&response) {
            Ok(json) => Event::default().event("message").data(json),
            Err(e) => {
                tracing::error!("Failed to encode response: {}", e);
                Event::default().comment("encode error")
            }
        };
        Some((Ok(event), (rx, guard)))
    });

    Sse::new(first.chain(responses)).keep_alive(KeepAlive::default())
}

/// POST /messages?session_id=<uuid>
async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> StatusCode {
    let sender = state.sessions.read().await.get(&query.session_id).cloned();
    let Some(sender) = sender else {
        return StatusCode::NOT_FOUND;
    };
    if sender.is_closed() {
        state.sessions.write().await.remove(&query.session_id);
        return StatusCode::GONE;
    }

    let server = state.server.clone();
    let session = query.session_id;
    tokio::spawn(async move {
        if let Some(response) = server.handle_raw(&body).await {
            if sender.send(response).await.is_err() {
                tracing::warn!(session = %session, "Stream closed before response was delivered");
            }
        }
    });
    StatusCode::ACCEPTED
}

/// POST /mcp
async fn post_mcp(State(state): State<AppState>, body: String) -> Response {
    match state.server.handle_raw(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
