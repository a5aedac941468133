use crate::agent::{AgentError, ChatAgent};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub const READY_BANNER: &str = "Axum + Supabase + Gemini ready!";

#[derive(Clone)]
struct AppState {
    agent: Arc<ChatAgent>,
}

#[derive(Deserialize)]
pub struct AddMessageParams {
    pub username: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ChatParams {
    pub message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    user_message: String,
    ai_response: String,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

pub fn router(agent: Arc<ChatAgent>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/add_message/", post(add_message_handler))
        .route("/get_messages/", get(get_messages_handler))
        .route("/chat/", get(chat_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<ChatAgent>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = router(agent);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Every pipeline failure maps to one opaque 500; the error kind only picks
/// the log line.
fn internal_error(err: &AgentError) -> (StatusCode, Json<ErrorBody>) {
    match err {
        AgentError::Store(e) => error!("Storage failure: {}", e),
        AgentError::Generation(e) => error!("Generation failure: {}", e),
        AgentError::Config(e) => error!("Configuration failure: {}", e),
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": READY_BANNER }))
}

async fn add_message_handler(
    State(state): State<AppState>,
    Query(params): Query<AddMessageParams>,
) -> impl IntoResponse {
    match state.agent.add_message(&params.username, &params.message).await {
        Ok(data) => {
            (StatusCode::OK, Json(json!({ "status": "success", "data": data }))).into_response()
        }
        Err(e) => internal_error(&e).into_response(),
    }
}

async fn get_messages_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.agent.list_messages().await {
        Ok(messages) => (StatusCode::OK, Json(json!({ "messages": messages }))).into_response(),
        Err(e) => internal_error(&e).into_response(),
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    Query(params): Query<ChatParams>,
) -> impl IntoResponse {
    match state.agent.chat(&params.message).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(ChatResponse {
                user_message: params.message,
                ai_response: answer,
            }),
        )
            .into_response(),
        Err(e) => internal_error(&e).into_response(),
    }
}
