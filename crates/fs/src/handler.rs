// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP command-dispatch surface: a single `POST /api/v0/command`
//! route that maps a [`CommandRequest`] onto the handful of commands this
//! build understands.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::post;
use axum::{Json, Router};
use ipfsd_core::{Reason, Stopper};
use ipfsd_wire::{CommandPath, CommandReply, CommandRequest};

/// Shared state the command handler needs. Cloned cheaply per request via
/// `axum::extract::State`.
#[derive(Clone)]
pub struct HandlerState {
    stopper: Arc<Stopper>,
}

impl HandlerState {
    pub fn new(stopper: Arc<Stopper>) -> Self {
        Self { stopper }
    }
}

/// The router mounted on every acquired listener.
pub fn router(state: HandlerState) -> Router {
    Router::new().route("/api/v0/command", post(dispatch_command)).with_state(state)
}

async fn dispatch_command(
    State(state): State<HandlerState>,
    Json(request): Json<CommandRequest>,
) -> HttpResponse {
    let daemon = CommandPath::new(["service", "daemon"]);
    let stop = CommandPath::new(["service", "daemon", "stop"]);

    if request.path == stop {
        return match state.stopper.stop(Reason::Requested) {
            Ok(()) => Json(CommandReply::Accepted).into_response(),
            Err(e) => (StatusCode::CONFLICT, e.to_string()).into_response(),
        };
    }

    if request.path == daemon {
        return Json(CommandReply::local_only(daemon)).into_response();
    }

    (StatusCode::NOT_FOUND, format!("unknown command {}", request.path)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn request_body(path: CommandPath) -> Body {
        Body::from(serde_json::to_vec(&CommandRequest::new(path)).unwrap())
    }

    #[tokio::test]
    async fn stop_command_signals_the_stopper() {
        let stopper = Arc::new(Stopper::new());
        let rx = stopper.initialize(CancellationToken::new()).unwrap();
        let app = router(HandlerState::new(stopper));

        let req = Request::post("/api/v0/command")
            .header("content-type", "application/json")
            .body(request_body(CommandPath::new(["service", "daemon", "stop"])))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(rx.await.unwrap(), Reason::Requested);
    }

    #[tokio::test]
    async fn bare_daemon_command_is_reported_local_only() {
        let stopper = Arc::new(Stopper::new());
        let _rx = stopper.initialize(CancellationToken::new()).unwrap();
        let app = router(HandlerState::new(stopper));

        let req = Request::post("/api/v0/command")
            .header("content-type", "application/json")
            .body(request_body(CommandPath::new(["service", "daemon"])))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_command_is_not_found() {
        let stopper = Arc::new(Stopper::new());
        let _rx = stopper.initialize(CancellationToken::new()).unwrap();
        let app = router(HandlerState::new(stopper));

        let req = Request::post("/api/v0/command")
            .header("content-type", "application/json")
            .body(request_body(CommandPath::new(["service", "nonsense"])))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
