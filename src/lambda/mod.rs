// src/lambda/mod.rs

//! AWS Lambda handler for the sync pipeline.
//!
//! One function serves all three operations; the payload's `operation` field
//! selects which handler runs:
//!
//! ```json
//! { "operation": "sync", "eventId": "https://..." }
//! ```
//!
//! The response mirrors an HTTP reply as `{ "statusCode", "body" }`.

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::{build_context, load_from_env};
use crate::error::Result;
use crate::handlers::{self, HandlerResponse, ResponseBody};
use crate::pipeline::PipelineContext;

/// Operation requested by an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Read a leaderboard
    Standings,
    /// Create members from a roster page
    SeedRoster,
    /// Full roster and standings sync
    Sync,
}

/// Lambda invocation payload.
#[derive(Debug, Deserialize)]
pub struct InvocationRequest {
    pub operation: Operation,

    #[serde(rename = "eventId")]
    pub event_id: Option<String>,

    /// Roster page, for `seed_roster`
    pub url: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, PartialEq, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

impl From<HandlerResponse> for InvocationResponse {
    fn from(response: HandlerResponse) -> Self {
        Self {
            status_code: response.status,
            body: response.body,
        }
    }
}

/// Load configuration from the environment and wire a context.
///
/// Called once per cold start; the context is reused across invocations.
pub fn init_context() -> Result<Arc<PipelineContext>> {
    let config = load_from_env()?;
    info!("Using {:?} store backend", config.store.backend);
    Ok(Arc::new(build_context(config)?))
}

/// Run one operation against a context.
pub async fn dispatch(ctx: &PipelineContext, request: &InvocationRequest) -> HandlerResponse {
    let event_id = request.event_id.as_deref();
    match request.operation {
        Operation::Standings => handlers::get_scoreboard_data(ctx, event_id).await,
        Operation::SeedRoster => {
            handlers::set_participant_data(ctx, request.url.as_deref(), event_id).await
        }
        Operation::Sync => handlers::update_user_database(ctx, event_id).await,
    }
}

/// Main Lambda handler function.
#[instrument(skip(ctx, event))]
pub async fn handler(
    ctx: Arc<PipelineContext>,
    event: LambdaEvent<InvocationRequest>,
) -> std::result::Result<InvocationResponse, LambdaError> {
    let (request, _context) = event.into_parts();
    info!("Handling {:?} for event {:?}", request.operation, request.event_id);

    let response = dispatch(&ctx, &request).await;
    if response.is_success() {
        info!("{:?} finished with status {}", request.operation, response.status);
    } else {
        error!("{:?} finished with status {}", request.operation, response.status);
    }
    Ok(response.into())
}
