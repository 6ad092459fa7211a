// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Google Sheets values API: clear a range, then write the new rows.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("request to Google Sheets failed")]
    Http(#[from] reqwest::Error),

    #[error("Google Sheets returned {status} for {operation}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },
}

/// Summary of an update call, from Google's `UpdateValuesResponse`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSummary {
    pub updated_range: String,
    pub updated_rows: u64,
    pub updated_columns: u64,
    pub updated_cells: u64,
}

/// Client for one spreadsheet's values endpoints.
pub struct SheetsClient {
    http: Client,
    base_url: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: &str) -> Result<Self, SheetsError> {
        Self::with_base_url(spreadsheet_id, API_BASE)
    }

    /// Point the client at a different endpoint (tests use a local stub).
    pub fn with_base_url(spreadsheet_id: &str, base_url: &str) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    /// Clear every value in `range`.
    pub async fn clear(&self, access_token: &str, range: &str) -> Result<(), SheetsError> {
        let url = format!(
            "{}/{}/values/{}:clear",
            self.base_url, self.spreadsheet_id, range
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&json!({}))
            .send()
            .await?;
        check_status("clear", response).await?;
        debug!("cleared {range}");
        Ok(())
    }

    /// Write `values` starting at `range`, letting Sheets parse cell
    /// contents the way typed input would be.
    pub async fn update(
        &self,
        access_token: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<UpdateSummary, SheetsError> {
        let url = format!(
            "{}/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        );
        let response = self
            .http
            .put(&url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(access_token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        let response = check_status("update", response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Api {
        operation,
        status: status.as_u16(),
        body,
    })
}
