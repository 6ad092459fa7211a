// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Interactive consent flow: a short-lived localhost server that walks the
//! user through Google's consent screen and captures the callback code.

use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::{AuthError, OAuthClient, TokenSet};

struct FlowState {
    client: OAuthClient,
    done: Mutex<Option<oneshot::Sender<Result<TokenSet, AuthError>>>>,
}

/// Run the consent flow to completion and return the token set.
///
/// Serves `/authorize` (redirects to Google) and `/authenticate` (receives
/// the code and exchanges it). The server shuts down once a code has been
/// exchanged; persisting the returned tokens is the caller's job.
pub async fn run_interactive(client: OAuthClient) -> Result<TokenSet, AuthError> {
    let port = client.config().port;
    let (done_tx, done_rx) = oneshot::channel();
    let state = Arc::new(FlowState {
        client,
        done: Mutex::new(Some(done_tx)),
    });

    let app = Router::new()
        .route("/authorize", get(authorize))
        .route("/authenticate", get(authenticate))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|source| AuthError::Bind { port, source })?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        let serve_future = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let _ = serve_future.await;
    });

    info!("authorize via http://localhost:{port}/authorize");

    let outcome = done_rx.await.map_err(|_| AuthError::FlowAborted)?;
    // Let the in-flight callback response finish before tearing down.
    let _ = shutdown_tx.send(());
    let _ = server.await;
    outcome
}

async fn authorize(State(state): State<Arc<FlowState>>) -> Redirect {
    Redirect::temporary(&state.client.consent_url())
}

#[derive(Deserialize)]
struct CallbackQuery {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

async fn authenticate(
    State(state): State<Arc<FlowState>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        warn!("consent screen returned an error: {error}");
        return (StatusCode::BAD_REQUEST, format!("authorization failed: {error}"))
            .into_response();
    }
    let Some(code) = query.code else {
        return (StatusCode::BAD_REQUEST, "missing authorization code").into_response();
    };

    match state.client.exchange_code(&code).await {
        Ok(tokens) => {
            if let Some(done) = state.done.lock().unwrap().take() {
                let _ = done.send(Ok(tokens));
            }
            "Authenticated, saving token to your home directory.".into_response()
        }
        Err(err) => {
            let message = err.to_string();
            if let Some(done) = state.done.lock().unwrap().take() {
                let _ = done.send(Err(err));
            }
            (StatusCode::BAD_GATEWAY, message).into_response()
        }
    }
}
