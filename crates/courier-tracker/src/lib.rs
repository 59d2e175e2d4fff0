//! courier-tracker
//!
//! The correlation receiver: turns anonymous pixel retrievals into
//! per-message open events.
//!
//! One route, one rule: the requester is an uncontrolled third party (a
//! mail client rendering HTML), so it always receives a valid image with
//! status 200, even for unknown tracking ids and even when the log append
//! fails. Storage trouble goes to the operational log, never to the caller.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use courier_core::domain::{OpenEvent, TrackingId};
use courier_core::ports::{Clock, OpenLog};

/// 1x1 transparent GIF, 43 bytes. Served on every request.
pub const PIXEL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

/// Signature recorded when the requester sends no User-Agent.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Shared handler state: the open log and the clock stamping the events.
#[derive(Clone)]
pub struct TrackerState {
    pub open_log: Arc<dyn OpenLog>,
    pub clock: Arc<dyn Clock>,
}

impl TrackerState {
    pub fn new(open_log: Arc<dyn OpenLog>, clock: Arc<dyn Clock>) -> Self {
        Self { open_log, clock }
    }
}

/// The tracker application: `GET /track/:tracking_id`.
pub fn app(state: TrackerState) -> Router {
    Router::new()
        .route("/track/:tracking_id", get(track_open))
        .with_state(state)
}

/// Append one open event and serve the pixel.
///
/// The tracking id is taken verbatim from the path: ids that match no
/// SendRecord are still logged (the reconciler drops orphans later), and a
/// failed append must not change the response.
pub async fn track_open(
    State(state): State<TrackerState>,
    Path(tracking_id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let client_signature = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string();

    let event = OpenEvent {
        opened_time: state.clock.now(),
        tracking_id: TrackingId::new(tracking_id.clone()),
        client_signature,
    };

    match state.open_log.append(event).await {
        Ok(()) => tracing::info!(tracking_id = %tracking_id, "open tracked"),
        Err(error) => tracing::error!(
            tracking_id = %tracking_id,
            %error,
            "open event not recorded"
        ),
    }

    ([(header::CONTENT_TYPE, "image/gif")], PIXEL_GIF)
}
