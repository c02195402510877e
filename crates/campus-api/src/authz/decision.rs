// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization decisions and engine settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Decision
// =============================================================================

/// Outcome of an authorization check or a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Access granted.
    Allow,
    /// Access refused.
    Deny,
    /// No opinion; the next voter decides.
    Abstain,
}

impl Decision {
    /// Returns the decision name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
            Decision::Abstain => "abstain",
        }
    }

    /// Returns `true` for [`Decision::Allow`].
    #[inline]
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Returns `true` for [`Decision::Abstain`].
    #[inline]
    pub fn is_abstain(&self) -> bool {
        matches!(self, Decision::Abstain)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ConflictResolution
// =============================================================================

/// How a role grant interacts with voters on the same endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    /// A matching role allows immediately; voters are skipped.
    #[default]
    RoleAllowWins,
    /// Voters still run after a role grant and an explicit deny overrides it.
    VoterDenyWins,
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Settings for [`AuthorizationEngine`](super::AuthorizationEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decision when neither roles nor voters decide. Never `Abstain`.
    pub default_decision: Decision,
    /// Role/voter conflict rule.
    pub conflict_resolution: ConflictResolution,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_decision: Decision::Deny,
            conflict_resolution: ConflictResolution::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a validated configuration.
    pub fn new(default_decision: Decision, conflict_resolution: ConflictResolution) -> ApiResult<Self> {
        let config = Self {
            default_decision,
            conflict_resolution,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects an `Abstain` default decision.
    pub fn validate(&self) -> ApiResult<()> {
        if self.default_decision.is_abstain() {
            return Err(ApiError::configuration(
                "Default decision must be 'allow' or 'deny'",
            ));
        }
        Ok(())
    }
}
