// src/handlers/mod.rs

//! Request handlers shared by the HTTP server and the Lambda entry point.
//!
//! Each handler validates its inputs, runs one pipeline operation and maps
//! the outcome to a status code and body. Failure detail is logged, never
//! returned to the caller.

#[cfg(feature = "server")]
pub mod server;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::models::EventReference;
use crate::pipeline::{self, PipelineContext};
use crate::utils::non_blank;

/// Response body: JSON document or plain text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Status code and body of a handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl HandlerResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Text(body.into()),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON body carrying an event reference.
#[derive(Debug, Default, Deserialize)]
pub struct EventBody {
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
}

impl EventBody {
    /// Parse a request body; anything unreadable counts as no event.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

/// Fetch standings from a leaderboard URL.
pub async fn get_scoreboard_data(ctx: &PipelineContext, event_id: Option<&str>) -> HandlerResponse {
    log::info!("Event ID received: {:?}", event_id);

    let Some(event_id) = non_blank(event_id) else {
        return HandlerResponse::text(400, "Event ID is required");
    };

    match pipeline::run_fetch_standings(ctx, event_id).await {
        Ok(standings) => match serde_json::to_value(&standings) {
            Ok(body) => HandlerResponse::json(200, body),
            Err(e) => {
                log::error!("Error scraping data: {}", e);
                HandlerResponse::text(500, "Error scraping data")
            }
        },
        Err(e) => {
            log::error!("Error scraping data: {}", e);
            HandlerResponse::text(500, "Error scraping data")
        }
    }
}

/// Seed an event's organization from a roster page.
pub async fn set_participant_data(
    ctx: &PipelineContext,
    url: Option<&str>,
    event_id: Option<&str>,
) -> HandlerResponse {
    let Some(url) = non_blank(url) else {
        return HandlerResponse::text(400, "URL is required");
    };
    let Some(event_id) = non_blank(event_id) else {
        return HandlerResponse::text(400, "Event ID is required");
    };

    match pipeline::run_seed_roster(ctx, url, &EventReference::new(event_id)).await {
        Ok(_) => HandlerResponse::json(200, json!({ "message": "Participants added to member store" })),
        Err(e) => {
            log::error!("Error scraping participant data: {}", e);
            HandlerResponse::text(500, "Error scraping participant data")
        }
    }
}

/// Run a full member sync for an event.
pub async fn update_user_database(ctx: &PipelineContext, event_id: Option<&str>) -> HandlerResponse {
    let Some(event_id) = non_blank(event_id) else {
        return HandlerResponse::text(400, "Missing eventId parameter.");
    };

    match pipeline::run_full_sync(ctx, &EventReference::new(event_id)).await {
        Ok(_) => HandlerResponse::text(200, "User database updated successfully."),
        Err(e) => {
            log::error!("Error updating user database: {}", e);
            HandlerResponse::text(500, "Error updating user database.")
        }
    }
}
