// src/handlers/server.rs

//! HTTP routes over the request handlers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};

use crate::error::Result;
use crate::handlers::{self, EventBody, HandlerResponse, ResponseBody};
use crate::pipeline::PipelineContext;

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.body {
            ResponseBody::Json(body) => (status, Json(body)).into_response(),
            ResponseBody::Text(body) => (status, body).into_response(),
        }
    }
}

type Params = Query<HashMap<String, String>>;

async fn scoreboard(State(ctx): State<Arc<PipelineContext>>, Query(params): Params) -> HandlerResponse {
    handlers::get_scoreboard_data(&ctx, params.get("eventId").map(String::as_str)).await
}

async fn participants(
    State(ctx): State<Arc<PipelineContext>>,
    Query(params): Params,
    body: Bytes,
) -> HandlerResponse {
    let body = EventBody::from_bytes(&body);
    handlers::set_participant_data(
        &ctx,
        params.get("url").map(String::as_str),
        body.event_id.as_deref(),
    )
    .await
}

async fn user_database(State(ctx): State<Arc<PipelineContext>>, body: Bytes) -> HandlerResponse {
    let body = EventBody::from_bytes(&body);
    handlers::update_user_database(&ctx, body.event_id.as_deref()).await
}

/// Build the application router.
pub fn router(ctx: Arc<PipelineContext>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/getScoreboardData", get(scoreboard))
        .route("/setParticipantData", post(participants))
        .route("/updateUserDatabase", post(user_database))
        .with_state(ctx)
}

/// Serve the router until the process is stopped.
pub async fn serve(ctx: Arc<PipelineContext>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response_status() {
        let response = HandlerResponse::text(400, "URL is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_json_response_content_type() {
        let response =
            HandlerResponse::json(200, serde_json::json!({ "message": "ok" })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }
}
