// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::types::{BillDetail, MasterListEntry};
use crate::fetcher::DetailSource;

const API_BASE: &str = "https://api.legiscan.com/";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors from the LegiScan API boundary
#[derive(Error, Debug)]
pub enum LegiscanError {
    #[error("request to LegiScan failed")]
    Http(#[from] reqwest::Error),

    /// The envelope came back with a non-OK status
    #[error("LegiScan rejected {operation}: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    /// The envelope parsed but its payload had an unexpected shape
    #[error("unexpected LegiScan payload for {operation}")]
    Payload {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// --- wire envelopes ---

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    alert: Option<Alert>,
    #[serde(default)]
    masterlist: Option<Value>,
    #[serde(default)]
    bill: Option<Value>,
}

#[derive(Deserialize)]
struct Alert {
    #[serde(default)]
    message: String,
}

/// Client for the LegiScan REST API.
#[derive(Clone)]
pub struct LegiscanClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl LegiscanClient {
    pub fn new(api_key: &str) -> Result<Self, LegiscanError> {
        Self::with_base_url(api_key, API_BASE)
    }

    /// Point the client at a different endpoint (tests use a local stub).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, LegiscanError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string() + "/",
            api_key: api_key.to_string(),
        })
    }

    /// Retrieve the master list of bills for a state session, in the
    /// order LegiScan reports them.
    pub async fn master_list(&self, state: &str) -> Result<Vec<MasterListEntry>, LegiscanError> {
        let envelope = self
            .request("getMasterList", &[("state", state)])
            .await?;
        let masterlist = envelope.masterlist.ok_or_else(|| missing_field("getMasterList"))?;
        let bills = bills_in_order(&masterlist)?;
        debug!("master list has {} bills", bills.len());
        Ok(bills)
    }

    /// Retrieve the full record for one bill.
    pub async fn bill_detail(&self, bill_id: i64) -> Result<BillDetail, LegiscanError> {
        let envelope = self
            .request("getBill", &[("id", &bill_id.to_string())])
            .await?;
        let bill = envelope.bill.ok_or_else(|| missing_field("getBill"))?;
        serde_json::from_value(bill).map_err(|source| LegiscanError::Payload {
            operation: "getBill",
            source,
        })
    }

    async fn request(
        &self,
        operation: &'static str,
        params: &[(&str, &str)],
    ) -> Result<Envelope, LegiscanError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("op", operation)])
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let envelope: Envelope = response.json().await?;
        if envelope.status != "OK" {
            let message = envelope
                .alert
                .map(|alert| alert.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("status {:?}", envelope.status));
            return Err(LegiscanError::Api { operation, message });
        }
        Ok(envelope)
    }
}

#[async_trait]
impl DetailSource for LegiscanClient {
    type Detail = BillDetail;

    async fn fetch_detail(&self, id: i64) -> anyhow::Result<BillDetail> {
        Ok(self.bill_detail(id).await?)
    }
}

/// The masterlist object maps numeric string keys to bill summaries, plus
/// a `session` entry. Bills come back sorted by numeric key.
fn bills_in_order(masterlist: &Value) -> Result<Vec<MasterListEntry>, LegiscanError> {
    let object = masterlist
        .as_object()
        .ok_or_else(|| missing_field("getMasterList"))?;
    let mut numbered: Vec<(usize, &Value)> = object
        .iter()
        .filter_map(|(key, value)| key.parse::<usize>().ok().map(|n| (n, value)))
        .collect();
    numbered.sort_by_key(|(n, _)| *n);
    numbered
        .into_iter()
        .map(|(_, value)| {
            serde_json::from_value(value.clone()).map_err(|source| LegiscanError::Payload {
                operation: "getMasterList",
                source,
            })
        })
        .collect()
}

fn missing_field(operation: &'static str) -> LegiscanError {
    use serde::de::Error as _;
    LegiscanError::Payload {
        operation,
        source: serde_json::Error::custom("expected payload field is missing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masterlist_keys_sort_numerically() {
        // keys "10" and "2" must not sort lexicographically
        let masterlist = json!({
            "session": {"session_id": 2020},
            "0": {"bill_id": 100, "change_hash": "a"},
            "1": {"bill_id": 101, "change_hash": "b"},
            "2": {"bill_id": 102, "change_hash": "c"},
            "10": {"bill_id": 110, "change_hash": "d"}
        });
        let bills = bills_in_order(&masterlist).unwrap();
        let ids: Vec<i64> = bills.iter().map(|bill| bill.bill_id).collect();
        assert_eq!(ids, vec![100, 101, 102, 110]);
    }

    #[test]
    fn session_entry_is_skipped() {
        let masterlist = json!({
            "session": {"session_id": 2020, "session_name": "2025-2026 Regular Session"},
            "0": {"bill_id": 1, "change_hash": "a"}
        });
        let bills = bills_in_order(&masterlist).unwrap();
        assert_eq!(bills.len(), 1);
    }

    #[test]
    fn malformed_bill_summary_is_an_error() {
        let masterlist = json!({
            "0": {"change_hash": "a"}
        });
        let err = bills_in_order(&masterlist).unwrap_err();
        assert!(matches!(
            err,
            LegiscanError::Payload {
                operation: "getMasterList",
                ..
            }
        ));
    }

    #[test]
    fn non_object_masterlist_is_an_error() {
        assert!(bills_in_order(&json!([1, 2, 3])).is_err());
    }
}
