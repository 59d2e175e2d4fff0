#![forbid(unsafe_code)]

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use courier_core::impls::csv_store::CsvOpenLog;
use courier_core::ports::SystemClock;
use courier_tracker::{app, TrackerState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bind = env::var("COURIER_TRACKER_BIND").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let addr: SocketAddr = bind.parse()?;
    let log_path =
        env::var("COURIER_OPENS_LOG").unwrap_or_else(|_| "opens_log.csv".to_string());

    let open_log = CsvOpenLog::new(&log_path);
    open_log.ensure_exists().await?;

    let state = TrackerState::new(Arc::new(open_log), Arc::new(SystemClock));

    tracing::info!(%addr, log = %log_path, "tracker listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
