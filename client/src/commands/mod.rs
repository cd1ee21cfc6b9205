//! Subcommand implementations. Plain-text rendering only.

pub mod account;
pub mod booking;
pub mod catalog;
pub mod reviews;

use anyhow::Result;
use stagepass::App;
use stagepass_core::{DateTime, Utc};
use stagepass_gateway::GatewayError;

/// Turn a feature's error into the command's failure
///
/// An authentication failure that expired the session reports the session's
/// explanation instead of the raw gateway message.
pub async fn outcome(app: &App, error: Option<GatewayError>) -> Result<()> {
    let Some(error) = error else {
        return Ok(());
    };
    let expired = if error.is_authentication() && !app.is_authenticated().await {
        app.session().state(|s| s.error.clone()).await
    } else {
        None
    };
    Err(expired.unwrap_or(error).into())
}

/// Local `YYYY-MM-DD HH:MM`
pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
