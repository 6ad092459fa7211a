// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Run configuration and the shared run context.
//!
//! Every shared resource (cache handle, API clients, token store) is
//! constructed once here and threaded through the commands explicitly.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::auth::{OAuthClient, OAuthConfig, TokenStore};
use crate::cache::CacheStore;
use crate::legiscan::LegiscanClient;
use crate::sheets::SheetsClient;

/// Spreadsheet the sheet rows land in unless overridden.
pub const DEFAULT_SPREADSHEET_ID: &str = "1PUWVVtRwmx5_XlD2brZJ_lpeVvBI6FLGRyn0AMtHKIE";

/// Resolved settings for one sync run.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub state: String,
    pub api_key: String,
    pub spreadsheet_id: String,
    pub sheet: String,
    pub batch_size: usize,
    pub cache_path: PathBuf,
    pub oauth: OAuthConfig,
}

/// Everything a sync run needs, built once at startup.
pub struct RunContext {
    pub settings: SyncSettings,
    pub cache: Arc<CacheStore>,
    pub legiscan: LegiscanClient,
    pub sheets: SheetsClient,
    pub oauth: OAuthClient,
    pub token_store: TokenStore,
}

impl RunContext {
    pub fn initialize(settings: SyncSettings) -> Result<Self> {
        let cache = Arc::new(CacheStore::open(&settings.cache_path)?);
        let legiscan = LegiscanClient::new(&settings.api_key)?;
        let sheets = SheetsClient::new(&settings.spreadsheet_id)?;
        let oauth = OAuthClient::new(settings.oauth.clone())?;
        let token_store = TokenStore::default_location()?;
        Ok(Self {
            settings,
            cache,
            legiscan,
            sheets,
            oauth,
            token_store,
        })
    }
}
