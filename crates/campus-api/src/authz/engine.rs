// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization decision engine.

use std::fmt;
use std::sync::Arc;

use campus_core::{AccountStore, Principal};

use super::decision::{ConflictResolution, Decision, EngineConfig};
use super::policy::EndpointPolicy;
use super::voter::InvocationParams;
use crate::auth::RoleResolver;
use crate::error::ApiResult;

// =============================================================================
// Verdict
// =============================================================================

/// What produced a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionReason {
    /// The endpoint is open.
    Exempt,
    /// No principal was attached to the request.
    Unauthenticated,
    /// One of the principal's roles is allowed.
    RoleGranted,
    /// The named voter decided.
    Voter(String),
    /// The named voter failed and was counted as DENY.
    VoterFailed(String),
    /// Nothing decided; the configured default applies.
    Default,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::Exempt => f.write_str("exempt"),
            DecisionReason::Unauthenticated => f.write_str("unauthenticated"),
            DecisionReason::RoleGranted => f.write_str("role"),
            DecisionReason::Voter(name) => write!(f, "voter:{name}"),
            DecisionReason::VoterFailed(name) => write!(f, "voter-failed:{name}"),
            DecisionReason::Default => f.write_str("default"),
        }
    }
}

/// A decision together with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// The final decision. Never `Abstain`.
    pub decision: Decision,
    /// What produced it.
    pub reason: DecisionReason,
}

impl Verdict {
    fn new(decision: Decision, reason: DecisionReason) -> Self {
        Self { decision, reason }
    }

    /// Returns `true` if access is granted.
    pub fn is_allow(&self) -> bool {
        self.decision.is_allow()
    }
}

// =============================================================================
// AuthorizationEngine
// =============================================================================

/// Combines endpoint roles and voters into a single decision.
///
/// Evaluation order:
/// 1. exempt endpoint: ALLOW
/// 2. no principal: DENY
/// 3. a principal role in the allowed set grants ALLOW
/// 4. voters in order, first non-ABSTAIN vote decides
/// 5. otherwise the configured default
///
/// When step 3 grants, [`ConflictResolution`] decides whether step 4 runs.
#[derive(Clone)]
pub struct AuthorizationEngine {
    config: EngineConfig,
    store: Arc<dyn AccountStore>,
}

impl AuthorizationEngine {
    /// Creates an engine.
    pub fn new(config: EngineConfig, store: Arc<dyn AccountStore>) -> ApiResult<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decides whether the principal may invoke the endpoint.
    pub async fn decide(
        &self,
        policy: &EndpointPolicy,
        principal: Option<&Principal>,
        params: &InvocationParams,
    ) -> Verdict {
        if policy.is_exempt() {
            return Verdict::new(Decision::Allow, DecisionReason::Exempt);
        }

        let Some(principal) = principal else {
            return Verdict::new(Decision::Deny, DecisionReason::Unauthenticated);
        };

        let role_granted = {
            let held = RoleResolver::role_names(&principal.roles);
            policy.allowed_roles().iter().any(|r| held.contains(r.as_str()))
        };

        if role_granted && self.config.conflict_resolution == ConflictResolution::RoleAllowWins {
            return Verdict::new(Decision::Allow, DecisionReason::RoleGranted);
        }

        for voter in policy.voter_list() {
            let vote = match voter.vote(principal, params, self.store.as_ref()).await {
                Ok(vote) => vote,
                Err(e) => {
                    tracing::warn!(
                        voter = voter.name(),
                        account_id = %principal.id,
                        error = %e,
                        "Voter lookup failed, denying"
                    );
                    return Verdict::new(
                        Decision::Deny,
                        DecisionReason::VoterFailed(voter.name().to_string()),
                    );
                }
            };

            tracing::trace!(voter = voter.name(), vote = %vote, "Vote cast");

            if !vote.is_abstain() {
                return Verdict::new(vote, DecisionReason::Voter(voter.name().to_string()));
            }
        }

        if role_granted {
            return Verdict::new(Decision::Allow, DecisionReason::RoleGranted);
        }

        Verdict::new(self.config.default_decision, DecisionReason::Default)
    }
}

impl fmt::Debug for AuthorizationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationEngine")
            .field("config", &self.config)
            .field("store", &self.store.name())
            .finish()
    }
}
