// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
pub mod authenticate;
pub mod sync;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::auth::OAuthConfig;

/// Bill sheet synchronization CLI
#[derive(Parser, Debug)]
#[command(name = "billsync")]
#[command(version)]
#[command(about = "Sync LegiScan bill data into a Google spreadsheet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the bill list and upload the sheet
    Sync(sync::SyncArgs),

    /// Run the Google consent flow and store a token
    Authenticate(authenticate::AuthenticateArgs),
}

/// OAuth application credentials, shared by both commands.
#[derive(Args, Debug, Clone)]
pub struct OAuthArgs {
    /// Google OAuth client ID
    #[arg(long, env = "GOOGLE_OAUTH_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// Google OAuth client secret
    #[arg(long, env = "GOOGLE_OAUTH_CONSUMER_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Port of the local consent callback listener
    #[arg(long, default_value_t = 8000)]
    pub callback_port: u16,
}

impl OAuthArgs {
    pub fn to_config(&self) -> OAuthConfig {
        OAuthConfig::new(&self.client_id, &self.client_secret, self.callback_port)
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync(args) => sync::run(args).await,
        Commands::Authenticate(args) => authenticate::run(args).await,
    }
}
