// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertion helpers with failure messages that name the decision path.

use campus_api::authz::{DecisionReason, Verdict};
use campus_api::Decision;

// =============================================================================
// Verdict Assertions
// =============================================================================

/// Assertion extensions for [`Verdict`].
pub trait VerdictAssertions {
    /// Assert the verdict grants access.
    fn assert_allowed(&self);

    /// Assert the verdict refuses access.
    fn assert_denied(&self);

    /// Assert the decision and its reason.
    fn assert_verdict(&self, decision: Decision, reason: DecisionReason);
}

impl VerdictAssertions for Verdict {
    fn assert_allowed(&self) {
        assert_eq!(
            self.decision,
            Decision::Allow,
            "Expected ALLOW, but got {} ({})",
            self.decision,
            self.reason
        );
    }

    fn assert_denied(&self) {
        assert_eq!(
            self.decision,
            Decision::Deny,
            "Expected DENY, but got {} ({})",
            self.decision,
            self.reason
        );
    }

    fn assert_verdict(&self, decision: Decision, reason: DecisionReason) {
        assert_eq!(
            (self.decision, &self.reason),
            (decision, &reason),
            "Expected {} ({}), but got {} ({})",
            decision,
            reason,
            self.decision,
            self.reason
        );
    }
}

/// Asserts that a rendered message does not leak which credential was wrong.
pub fn assert_generic_credentials_message(message: &str) {
    let lowered = message.to_lowercase();
    assert!(
        lowered.contains("username or password"),
        "Expected a generic credentials message, got '{message}'"
    );
    for leak in ["not found", "unknown user", "wrong password", "no such"] {
        assert!(
            !lowered.contains(leak),
            "Credentials message leaks detail ('{leak}'): '{message}'"
        );
    }
}
