//! AWS Lambda entry point for roster-sync
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//!
//! ## Environment Variables
//!
//! - `CONFIG_PATH`: Bundled configuration file (default: `data/config.toml`)
//! - `STORE_BACKEND`, `FIRESTORE_PROJECT_ID`, `FIRESTORE_ACCESS_TOKEN`: Store selection
//! - `HTTP_TIMEOUT_SECS`: HTTP request timeout
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_sync::lambda::{self, InvocationRequest};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("roster-sync Lambda starting...");
    let ctx = lambda::init_context()?;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<InvocationRequest>| {
        lambda::handler(ctx.clone(), event)
    }))
    .await
}
