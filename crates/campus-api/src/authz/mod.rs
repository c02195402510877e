// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization.
//!
//! Endpoints are guarded by an [`EndpointPolicy`] registered in the
//! [`PolicyTable`]. The [`AuthorizationEngine`] combines the policy's roles
//! with its [`Voter`]s into an ALLOW or DENY [`Verdict`].

mod decision;
mod engine;
mod policy;
mod voter;

pub use decision::{ConflictResolution, Decision, EngineConfig};
pub use engine::{AuthorizationEngine, DecisionReason, Verdict};
pub use policy::{default_policies, EndpointPolicy, PolicyTable};
pub use voter::{
    ClassMembershipVoter, InvocationParams, SelfMatchVoter, Voter, DEFAULT_ID_PARAM,
};
