// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! LegiScan API access: master list retrieval and per-bill detail fetch.

mod client;
mod types;

pub use client::{LegiscanClient, LegiscanError};
pub use types::{BillDetail, MasterListEntry, Sponsor, Subject, Supplement};
