// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! # Runtime Configuration
//!
//! This module defines environment variable names and the core
//! configuration record. Configuration is loaded from the environment at
//! startup; every knob has a production default.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SPINDRIFT_LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `SPINDRIFT_RPC_URL` | Override RPC endpoint for provider sessions | registry URL |
//! | `SPINDRIFT_DISCONNECT_GRACE_SECS` | Grace before disconnecting a wrong-network wallet | unset (never disconnect) |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::time::Duration;

use crate::backoff::BackoffPolicy;
use crate::chains::ChainTarget;

/// Environment variable name for the logging format.
pub const LOG_FORMAT_ENV: &str = "SPINDRIFT_LOG_FORMAT";

/// Environment variable name for the RPC endpoint override.
///
/// When set, provider sessions use this endpoint instead of the chain
/// registry's primary RPC URL. Useful for pointing at a local fork.
pub const RPC_URL_ENV: &str = "SPINDRIFT_RPC_URL";

/// Environment variable name for the wrong-network disconnect grace
/// period, in whole seconds.
pub const DISCONNECT_GRACE_ENV: &str = "SPINDRIFT_DISCONNECT_GRACE_SECS";

/// Core orchestration configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Confirmation polling policy for submitted transactions.
    pub confirmation: BackoffPolicy,
    /// How long a wallet may sit on the wrong network before the session
    /// is disconnected. `None` disables the scheduled disconnect.
    pub disconnect_grace: Option<Duration>,
    /// RPC endpoint override for provider sessions.
    pub rpc_override: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            confirmation: BackoffPolicy::confirmation(),
            disconnect_grace: None,
            rpc_override: None,
        }
    }
}

impl CoreConfig {
    /// Load configuration from the environment, falling back to the
    /// production defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let disconnect_grace = env::var(DISCONNECT_GRACE_ENV)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs);
        let rpc_override = env::var(RPC_URL_ENV).ok().filter(|v| !v.is_empty());

        Self {
            confirmation: BackoffPolicy::confirmation(),
            disconnect_grace,
            rpc_override,
        }
    }

    /// Effective RPC URL for a chain, honoring the environment override.
    pub fn rpc_url_for<'a>(&'a self, target: &'a ChainTarget) -> Option<&'a str> {
        self.rpc_override
            .as_deref()
            .or_else(|| target.primary_rpc_url())
    }
}
