// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::OAuthArgs;
use crate::auth;
use crate::config::{RunContext, SyncSettings, DEFAULT_SPREADSHEET_ID};
use crate::fetcher::CachedBatchFetcher;
use crate::progress::BarProgress;
use crate::report::{self, BillRecord};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Two-letter state code whose bills are synced
    #[arg(long, default_value = "MI")]
    pub state: String,

    /// LegiScan API key
    #[arg(long, env = "LEGISCAN_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Spreadsheet receiving the rows
    #[arg(long, env = "BILL_SPREADSHEET_ID", default_value = DEFAULT_SPREADSHEET_ID)]
    pub spreadsheet_id: String,

    /// Sheet (tab) the rows are written to
    #[arg(long, default_value = "bills")]
    pub sheet: String,

    /// Number of detail fetches dispatched per batch
    #[arg(long, default_value_t = 20)]
    pub batch_size: usize,

    /// Location of the fetch cache database
    #[arg(long, default_value = "cache.db")]
    pub cache_path: PathBuf,

    #[command(flatten)]
    pub oauth: OAuthArgs,
}

pub async fn run(args: SyncArgs) -> Result<()> {
    let settings = SyncSettings {
        state: args.state,
        api_key: args.api_key,
        spreadsheet_id: args.spreadsheet_id,
        sheet: args.sheet,
        batch_size: args.batch_size,
        cache_path: args.cache_path,
        oauth: args.oauth.to_config(),
    };
    let context = RunContext::initialize(settings)?;

    info!(
        "requesting {} master list from LegiScan",
        context.settings.state
    );
    let bills = context.legiscan.master_list(&context.settings.state).await?;

    info!("retrieving details for {} bills", bills.len());
    let progress = BarProgress::new();
    let fetcher = CachedBatchFetcher::new(
        context.legiscan.clone(),
        Arc::clone(&context.cache),
        context.settings.batch_size,
    );
    let fetched = fetcher.run(&bills, &progress).await?;

    let cache_hits = fetched.iter().filter(|item| item.cache_hit).count();
    info!("{cache_hits} of {} details served from cache", bills.len());

    let records: Vec<BillRecord> = bills
        .iter()
        .zip(fetched.iter())
        .map(|(entry, fetched)| BillRecord::merge(entry, &fetched.detail))
        .collect();
    let values = report::sheet_rows(&records);

    let access_token = auth::ensure_access_token(&context.oauth, &context.token_store).await?;

    info!("uploading to sheets");
    let sheet = &context.settings.sheet;
    context
        .sheets
        .clear(&access_token, &format!("{sheet}!A:ZZZ"))
        .await?;
    let summary = context
        .sheets
        .update(&access_token, &format!("{sheet}!A1"), &values)
        .await?;
    info!("uploaded {} rows ({} cells)", values.len(), summary.updated_cells);

    Ok(())
}
