use std::time::Duration;

use rochambeau::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const DEFAULT_BIND: &str = "0.0.0.0:3001";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    bind: String,
    match_config: MatchConfig,
}

/// Reads settings through `lookup`, falling back to defaults for anything
/// missing or unparsable.
fn settings_from(lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let mut match_config = MatchConfig::default();

    if let Some(raw) = lookup("ROCHAMBEAU_WIN_THRESHOLD") {
        match raw.trim().parse() {
            Ok(n) => match_config.win_threshold = n,
            Err(_) => tracing::warn!(%raw, "ignoring ROCHAMBEAU_WIN_THRESHOLD"),
        }
    }
    if let Some(raw) = lookup("ROCHAMBEAU_REMATCH_TIMEOUT_SECS") {
        match raw.trim().parse() {
            Ok(secs) => match_config.rematch_vote_timeout = Duration::from_secs(secs),
            Err(_) => tracing::warn!(%raw, "ignoring ROCHAMBEAU_REMATCH_TIMEOUT_SECS"),
        }
    }

    Settings {
        bind: lookup("ROCHAMBEAU_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
        match_config: match_config.validated(),
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = settings_from(|key| std::env::var(key).ok());
    tracing::info!(
        bind = %settings.bind,
        win_threshold = settings.match_config.win_threshold,
        rematch_timeout = ?settings.match_config.rematch_vote_timeout,
        "starting rock-paper-scissors server"
    );

    let server = RochambeauServer::builder()
        .bind(&settings.bind)
        .match_config(settings.match_config)
        .build()
        .await?;

    server.run().await?;
    Ok(())
}
