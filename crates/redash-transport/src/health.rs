// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Reachability of a Redash server
//!
//! Redash answers `GET /ping` with `PONG.` when the web process is up. The
//! status code of that reply is all a health check looks at.

use serde::{Deserialize, Serialize};

/// Outcome of a health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthStatus {
    /// The server answered the ping
    Up,
    /// The server answered, but not with success
    Degraded {
        /// What the server answered instead
        reason: String,
    },
    /// The server rejected the configured credentials
    Down {
        /// Why the server is considered unusable
        reason: String,
    },
}

impl HealthStatus {
    /// Map the status code of a ping reply
    ///
    /// 2xx is `Up`, 401/403 is `Down`, anything else `Degraded`.
    pub fn from_ping_status(status: u16) -> Self {
        match status {
            200..=299 => HealthStatus::Up,
            401 | 403 => HealthStatus::Down {
                reason: "Authentication failed".to_string(),
            },
            other => HealthStatus::Degraded {
                reason: format!("ping returned status {other}"),
            },
        }
    }

    /// Whether requests can still be expected to reach the server
    pub fn is_available(&self) -> bool {
        !self.is_down()
    }

    /// Whether the server is unusable with the current configuration
    pub fn is_down(&self) -> bool {
        matches!(self, HealthStatus::Down { .. })
    }

    /// Short human-readable summary
    pub fn description(&self) -> &str {
        match self {
            HealthStatus::Up => "Redash is reachable",
            HealthStatus::Degraded { reason } | HealthStatus::Down { reason } => reason,
        }
    }
}
