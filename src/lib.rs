// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod legiscan;
pub mod progress;
pub mod report;
pub mod sheets;

pub use cache::{CacheError, CacheStore};
pub use fetcher::{CachedBatchFetcher, DetailSource, FetchError, Fetched, WorkItem};
pub use legiscan::{BillDetail, LegiscanClient, LegiscanError, MasterListEntry};
pub use progress::{BarProgress, NullProgress, ProgressSink};
pub use sheets::{SheetsClient, SheetsError};
