// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
use std::env;

use anyhow::Result;
use billsync::cli::{self, Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli::execute(cli).await
}
