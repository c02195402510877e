// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Authorization Integration Tests
//!
//! Drives [`AuthorizationEngine`] directly against the fixture store.
//!
//! - `test_engine_*`: evaluation order
//! - `test_conflict_*`: role grant versus voter denial under both settings
//! - `test_voter_*`: the built-in voters over real store data
//! - `test_policy_*`: policy table lookups and validation

use std::sync::Arc;

use axum::http::Method;
use campus_api::authz::{
    ClassMembershipVoter, DecisionReason, InvocationParams, SelfMatchVoter,
};
use campus_api::{
    default_policies, served_routes, AuthorizationEngine, ConflictResolution, Decision,
    EndpointPolicy, EngineConfig, PolicyTable,
};
use campus_core::{role_names, AccountStore};
use campus_tests::prelude::*;

fn engine_with(default_decision: Decision, conflict: ConflictResolution) -> AuthorizationEngine {
    let store: Arc<dyn AccountStore> = Arc::new(CampusFixtures::fast_store());
    let config = EngineConfig::new(default_decision, conflict).expect("valid engine config");
    AuthorizationEngine::new(config, store).expect("engine")
}

fn engine() -> AuthorizationEngine {
    engine_with(Decision::Deny, ConflictResolution::RoleAllowWins)
}

fn class_params(id: i64) -> InvocationParams {
    InvocationParams::new().with("id", id.to_string())
}

// =============================================================================
// Evaluation Order
// =============================================================================

#[tokio::test]
async fn test_engine_exempt_allows_anonymous() {
    let verdict = engine()
        .decide(&EndpointPolicy::exempt(), None, &InvocationParams::new())
        .await;
    verdict.assert_verdict(Decision::Allow, DecisionReason::Exempt);
}

#[tokio::test]
async fn test_engine_anonymous_denied_even_with_default_allow() {
    let engine = engine_with(Decision::Allow, ConflictResolution::RoleAllowWins);
    let verdict = engine
        .decide(&EndpointPolicy::roles([role_names::ADMIN]), None, &InvocationParams::new())
        .await;
    verdict.assert_verdict(Decision::Deny, DecisionReason::Unauthenticated);
}

#[tokio::test]
async fn test_engine_role_intersection_grants() {
    let policy = EndpointPolicy::roles([role_names::TEACHER, role_names::ADMIN]);
    let teacher = CampusFixtures::principal(TEACHER_USER);

    let verdict = engine().decide(&policy, Some(&teacher), &InvocationParams::new()).await;
    verdict.assert_verdict(Decision::Allow, DecisionReason::RoleGranted);
}

#[tokio::test]
async fn test_engine_no_roles_no_voters_uses_default() {
    let policy = EndpointPolicy::roles([role_names::ADMIN]);
    let student = CampusFixtures::principal(ADA_USER);

    engine()
        .decide(&policy, Some(&student), &InvocationParams::new())
        .await
        .assert_verdict(Decision::Deny, DecisionReason::Default);

    engine_with(Decision::Allow, ConflictResolution::RoleAllowWins)
        .decide(&policy, Some(&student), &InvocationParams::new())
        .await
        .assert_verdict(Decision::Allow, DecisionReason::Default);
}

#[tokio::test]
async fn test_engine_first_decisive_voter_wins() {
    let abstain = ScriptedVoter::new("abstain", Decision::Abstain);
    let allow = ScriptedVoter::new("allow", Decision::Allow);
    let deny = ScriptedVoter::new("deny", Decision::Deny);
    let policy = EndpointPolicy::default()
        .with_voter(abstain.clone())
        .with_voter(allow.clone())
        .with_voter(deny.clone());

    let principal = PrincipalBuilder::new(77).build();
    engine()
        .decide(&policy, Some(&principal), &InvocationParams::new())
        .await
        .assert_verdict(Decision::Allow, DecisionReason::Voter("allow".to_string()));

    assert_eq!(abstain.calls(), 1);
    assert_eq!(allow.calls(), 1);
    assert_eq!(deny.calls(), 0);
}

#[tokio::test]
async fn test_engine_all_abstain_falls_to_default() {
    let policy = EndpointPolicy::default()
        .with_voter(ScriptedVoter::new("a", Decision::Abstain))
        .with_voter(ScriptedVoter::new("b", Decision::Abstain));
    let principal = PrincipalBuilder::new(77).build();

    engine()
        .decide(&policy, Some(&principal), &InvocationParams::new())
        .await
        .assert_verdict(Decision::Deny, DecisionReason::Default);
}

#[tokio::test]
async fn test_engine_voter_store_failure_denies() {
    let store: Arc<dyn AccountStore> =
        Arc::new(FailingStore::new(CampusFixtures::fast_store()).failing(StoreOp::FindStudentLink));
    let engine = AuthorizationEngine::new(
        EngineConfig::new(Decision::Allow, ConflictResolution::RoleAllowWins).unwrap(),
        store,
    )
    .unwrap();

    let policy = EndpointPolicy::default().with_voter(ClassMembershipVoter::default());
    let ada = CampusFixtures::principal(ADA_USER);

    engine
        .decide(&policy, Some(&ada), &class_params(CLASS_ALGORITHMS))
        .await
        .assert_verdict(
            Decision::Deny,
            DecisionReason::VoterFailed(ClassMembershipVoter::NAME.to_string()),
        );
}

#[test]
fn test_engine_rejects_abstain_default() {
    assert!(EngineConfig::new(Decision::Abstain, ConflictResolution::RoleAllowWins).is_err());
}

// =============================================================================
// Conflict Resolution
// =============================================================================

#[tokio::test]
async fn test_conflict_role_allow_wins_skips_voters() {
    let deny = ScriptedVoter::new("deny", Decision::Deny);
    let policy = EndpointPolicy::roles([role_names::TEACHER]).with_voter(deny.clone());
    let teacher = CampusFixtures::principal(TEACHER_USER);

    engine_with(Decision::Deny, ConflictResolution::RoleAllowWins)
        .decide(&policy, Some(&teacher), &InvocationParams::new())
        .await
        .assert_verdict(Decision::Allow, DecisionReason::RoleGranted);
    assert_eq!(deny.calls(), 0);
}

#[tokio::test]
async fn test_conflict_voter_deny_wins_overrides_role() {
    let deny = ScriptedVoter::new("deny", Decision::Deny);
    let policy = EndpointPolicy::roles([role_names::TEACHER]).with_voter(deny.clone());
    let teacher = CampusFixtures::principal(TEACHER_USER);

    engine_with(Decision::Deny, ConflictResolution::VoterDenyWins)
        .decide(&policy, Some(&teacher), &InvocationParams::new())
        .await
        .assert_verdict(Decision::Deny, DecisionReason::Voter("deny".to_string()));
    assert_eq!(deny.calls(), 1);
}

#[tokio::test]
async fn test_conflict_voter_deny_wins_keeps_role_grant_on_abstain() {
    let policy = EndpointPolicy::roles([role_names::TEACHER])
        .with_voter(ScriptedVoter::new("abstain", Decision::Abstain));
    let teacher = CampusFixtures::principal(TEACHER_USER);

    engine_with(Decision::Deny, ConflictResolution::VoterDenyWins)
        .decide(&policy, Some(&teacher), &InvocationParams::new())
        .await
        .assert_verdict(Decision::Allow, DecisionReason::RoleGranted);
}

#[tokio::test]
async fn test_conflict_class_listing_under_both_settings() {
    let policy = default_policies();
    let class_route = policy
        .lookup(&Method::GET, "/classes/{id}/students")
        .expect("class route has a policy");
    let cleo = CampusFixtures::principal(CLEO_USER);

    // Cleo monitors class 1; asking for class 2 is covered by the role but
    // refused by the membership voter.
    let params = class_params(CLASS_DATABASES);

    engine_with(Decision::Deny, ConflictResolution::RoleAllowWins)
        .decide(&class_route, Some(&cleo), &params)
        .await
        .assert_allowed();

    engine_with(Decision::Deny, ConflictResolution::VoterDenyWins)
        .decide(&class_route, Some(&cleo), &params)
        .await
        .assert_denied();
}

// =============================================================================
// Built-in Voters
// =============================================================================

#[tokio::test]
async fn test_voter_class_membership_over_fixtures() {
    let policy = EndpointPolicy::default().with_voter(ClassMembershipVoter::default());
    let engine = engine();

    let ada = CampusFixtures::principal(ADA_USER);
    engine
        .decide(&policy, Some(&ada), &class_params(CLASS_ALGORITHMS))
        .await
        .assert_verdict(
            Decision::Allow,
            DecisionReason::Voter(ClassMembershipVoter::NAME.to_string()),
        );
    engine
        .decide(&policy, Some(&ada), &class_params(CLASS_DATABASES))
        .await
        .assert_denied();

    // Dan has a student record but no class; the admin has neither.
    for username in [DAN_USER, ADMIN_USER] {
        engine
            .decide(&policy, Some(&CampusFixtures::principal(username)), &class_params(1))
            .await
            .assert_verdict(Decision::Deny, DecisionReason::Default);
    }
}

#[tokio::test]
async fn test_voter_class_membership_unparseable_id_denies() {
    let policy = EndpointPolicy::default().with_voter(ClassMembershipVoter::default());
    let ada = CampusFixtures::principal(ADA_USER);

    let params = InvocationParams::new().with("id", "first");
    engine().decide(&policy, Some(&ada), &params).await.assert_denied();
}

#[tokio::test]
async fn test_voter_self_match() {
    let policy = EndpointPolicy::default().with_voter(SelfMatchVoter::default());
    let engine = engine();
    let bob = CampusFixtures::principal(BOB_USER);

    engine
        .decide(&policy, Some(&bob), &InvocationParams::new().with("id", "4"))
        .await
        .assert_allowed();
    engine
        .decide(&policy, Some(&bob), &InvocationParams::new().with("id", "3"))
        .await
        .assert_denied();
    engine
        .decide(&policy, Some(&bob), &InvocationParams::new())
        .await
        .assert_denied();
}

#[tokio::test]
async fn test_voter_custom_parameter_name() {
    let policy = EndpointPolicy::default().with_voter(SelfMatchVoter::new("account_id"));
    let bob = CampusFixtures::principal(BOB_USER);

    engine()
        .decide(&policy, Some(&bob), &InvocationParams::new().with("account_id", "4"))
        .await
        .assert_allowed();
}

// =============================================================================
// Policy Table
// =============================================================================

#[test]
fn test_policy_defaults_cover_every_route() {
    let table = default_policies();
    table
        .validate(role_names::ALL.iter().copied(), &served_routes())
        .unwrap();

    for (method, route) in served_routes() {
        assert!(table.lookup(&method, route).is_some(), "{method} {route} has no policy");
    }
}

#[test]
fn test_policy_only_login_and_health_are_exempt() {
    let table = default_policies();
    let exempt: Vec<_> = served_routes()
        .into_iter()
        .filter(|(m, r)| table.lookup(m, r).is_some_and(|p| p.is_exempt()))
        .map(|(_, r)| r)
        .collect();

    assert_eq!(exempt, vec!["/health", "/accounts/login"]);
}

#[test]
fn test_policy_validate_rejects_unknown_role() {
    let table = PolicyTable::new().with(
        Method::GET,
        "/roles",
        EndpointPolicy::roles(["registrar"]),
    );
    assert!(table
        .validate(role_names::ALL.iter().copied(), &[(Method::GET, "/roles")])
        .is_err());
}

#[test]
fn test_policy_validate_rejects_missing_route() {
    let table = PolicyTable::new().with(Method::GET, "/health", EndpointPolicy::exempt());
    let routes = [(Method::GET, "/health"), (Method::GET, "/roles")];
    assert!(table.validate(role_names::ALL.iter().copied(), &routes).is_err());
}
