// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Progress reporting for the batched fetch run.

use indicatif::{ProgressBar, ProgressStyle};

/// Observer notified once per completed work item (cache hit or miss).
///
/// `cache_hits` is the running hit count at the time the item finished, so
/// a frontend can show both retrieval and cache figures from one stream of
/// callbacks.
pub trait ProgressSink: Send + Sync {
    fn begin(&self, _total: u64) {}
    fn item_done(&self, _cache_hits: u64) {}
    fn finish(&self) {}
}

/// Sink that reports nothing.
pub struct NullProgress;

impl ProgressSink for NullProgress {}

/// Console progress bar showing retrieved and cached counts.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template(
                "{bar:40} | Retrieved: {pos}/{len} ({percent}%) | Cached: {msg}/{len}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarProgress {
    fn begin(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_message("0");
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn item_done(&self, cache_hits: u64) {
        self.bar.set_message(cache_hits.to_string());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}
