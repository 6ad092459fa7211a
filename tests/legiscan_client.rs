// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! LegiScan client tests against a local API stub.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use billsync::legiscan::{LegiscanClient, LegiscanError};

#[derive(Default)]
struct Recorded {
    requests: Mutex<Vec<HashMap<String, String>>>,
}

async fn handler(
    State(state): State<Arc<Recorded>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.requests.lock().unwrap().push(params.clone());

    if params.get("key").map(String::as_str) == Some("bad-key") {
        return Json(json!({
            "status": "ERROR",
            "alert": {"message": "invalid api key"}
        }));
    }

    let body = match params.get("op").map(String::as_str) {
        Some("getMasterList") => json!({
            "status": "OK",
            "masterlist": {
                "session": {"session_id": 2026, "session_name": "2025-2026 Regular Session"},
                "0": {
                    "bill_id": 101, "number": "HB101", "change_hash": "aaa",
                    "last_action_date": "2026-01-10", "last_action": "introduced",
                    "title": "First", "description": "First bill",
                    "url": "https://legiscan.example/101"
                },
                "1": {
                    "bill_id": 102, "number": "HB102", "change_hash": "bbb",
                    "last_action_date": "2026-02-01", "last_action": "passed",
                    "title": "Second", "description": "Second bill",
                    "url": "https://legiscan.example/102"
                },
                "10": {
                    "bill_id": 110, "number": "HB110", "change_hash": "ccc",
                    "last_action_date": "2026-03-01", "last_action": "referred",
                    "title": "Eleventh", "description": "Eleventh bill",
                    "url": "https://legiscan.example/110"
                },
                "2": {
                    "bill_id": 103, "number": "HB103", "change_hash": "ddd",
                    "last_action_date": "2026-02-15", "last_action": "reported",
                    "title": "Third", "description": "Third bill",
                    "url": "https://legiscan.example/103"
                }
            }
        }),
        Some("getBill") => {
            let id: i64 = params
                .get("id")
                .and_then(|id| id.parse().ok())
                .unwrap_or_default();
            json!({
                "status": "OK",
                "bill": {
                    "bill_id": id,
                    "bill_number": format!("HB{id}"),
                    "description": format!("Bill {id}"),
                    "state_link": format!("https://state.example/{id}"),
                    "subjects": [{"subject_id": 1, "subject_name": "Courts"}],
                    "sponsors": [{"people_id": 7, "name": "Okafor"}],
                    "supplements": [{"supplement_id": 5, "type_id": 3, "type": "Fiscal Note"}]
                }
            })
        }
        _ => json!({"status": "ERROR", "alert": {"message": "unknown operation"}}),
    };
    Json(body)
}

async fn spawn_stub() -> (String, Arc<Recorded>) {
    let state = Arc::new(Recorded::default());
    let app = Router::new()
        .route("/", get(handler))
        .with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), state)
}

#[tokio::test]
async fn master_list_comes_back_in_numeric_key_order() {
    let (base, recorded) = spawn_stub().await;
    let client = LegiscanClient::with_base_url("test-key", &base).unwrap();

    let bills = client.master_list("MI").await.unwrap();

    let ids: Vec<i64> = bills.iter().map(|bill| bill.bill_id).collect();
    assert_eq!(ids, vec![101, 102, 103, 110]);
    assert_eq!(bills[0].change_hash, "aaa");

    let requests = recorded.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].get("op").unwrap(), "getMasterList");
    assert_eq!(requests[0].get("state").unwrap(), "MI");
    assert_eq!(requests[0].get("key").unwrap(), "test-key");
}

#[tokio::test]
async fn bill_detail_parses_nested_fields() {
    let (base, _recorded) = spawn_stub().await;
    let client = LegiscanClient::with_base_url("test-key", &base).unwrap();

    let detail = client.bill_detail(42).await.unwrap();

    assert_eq!(detail.bill_id, 42);
    assert_eq!(detail.bill_number, "HB42");
    assert_eq!(detail.subjects[0].subject_name, "Courts");
    assert_eq!(detail.sponsors[0].name, "Okafor");
    assert_eq!(detail.supplements[0].type_name, "Fiscal Note");
}

#[tokio::test]
async fn rejected_request_surfaces_the_alert_message() {
    let (base, _recorded) = spawn_stub().await;
    let client = LegiscanClient::with_base_url("bad-key", &base).unwrap();

    let err = client.master_list("MI").await.unwrap_err();

    match err {
        LegiscanError::Api { operation, message } => {
            assert_eq!(operation, "getMasterList");
            assert_eq!(message, "invalid api key");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
