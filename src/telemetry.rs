// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Tracing subscriber setup.
//!
//! Output format is selected by `SPINDRIFT_LOG_FORMAT` (`json` for
//! machine-readable logs, anything else for human-readable output); the
//! level filter comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;

use crate::config::LOG_FORMAT_ENV;

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; only the first call installs a
/// subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = std::env::var(LOG_FORMAT_ENV).unwrap_or_default();

    match format.as_str() {
        "json" => {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .try_init();
        }
        _ => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    }
}
