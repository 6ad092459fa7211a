// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
use anyhow::Result;
use clap::Args;
use tracing::info;

use super::OAuthArgs;
use crate::auth::{self, OAuthClient, TokenStore};

/// Arguments for the authenticate command
#[derive(Args, Debug)]
pub struct AuthenticateArgs {
    #[command(flatten)]
    pub oauth: OAuthArgs,

    /// Extra OAuth scopes to request alongside drive and spreadsheets
    #[arg(long = "scope")]
    pub extra_scopes: Vec<String>,
}

pub async fn run(args: AuthenticateArgs) -> Result<()> {
    let mut config = args.oauth.to_config();
    config.scopes.extend(args.extra_scopes);

    let client = OAuthClient::new(config)?;
    let store = TokenStore::default_location()?;

    let tokens = auth::run_interactive(client).await?;
    store.save(&tokens)?;
    info!("token saved to {}", store.path().display());

    Ok(())
}
