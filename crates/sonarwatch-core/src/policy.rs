//! Reconciliation policy
//!
//! Combines the classifier snapshot and the redirection check into a single
//! decision per poll cycle. The rule order is strict: once a rule fires the
//! later ones are not evaluated.

use crate::classify::DeviceStatusSnapshot;

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationDecision {
    /// Everything expected is present and wired; do nothing
    NoAction,

    /// Physical headset hardware is missing; a reset cannot fix a
    /// disconnect, so wait for the next poll
    WaitForHardware {
        /// Which physical endpoints are missing
        reason: String,
    },

    /// The routing subsystem's own state is broken; trigger its
    /// auto-configuration
    TriggerReset {
        /// What was found broken
        reason: String,
    },
}

impl ReconciliationDecision {
    /// The human-readable reason, if the decision carries one
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::NoAction => None,
            Self::WaitForHardware { reason } | Self::TriggerReset { reason } => Some(reason),
        }
    }

    /// Whether this decision requires the corrective call
    pub fn requires_reset(&self) -> bool {
        matches!(self, Self::TriggerReset { .. })
    }
}

/// Decide what to do about the current device state.
///
/// Precedence, first match wins:
///
/// 1. Physical output or input missing → [`ReconciliationDecision::WaitForHardware`].
///    Hardware absence indicates a disconnect or driver crash; resetting the
///    routing subsystem would not help and may disrupt a reconnect in
///    progress.
/// 2. Any virtual device missing → [`ReconciliationDecision::TriggerReset`].
/// 3. Any redirection inactive → [`ReconciliationDecision::TriggerReset`].
/// 4. Otherwise → [`ReconciliationDecision::NoAction`].
///
/// Rules 2 and 3 share one corrective action: the subsystem's
/// auto-configuration rebuilds all virtual devices and redirections at once
/// and cannot be targeted more finely.
pub fn decide(
    snapshot: &DeviceStatusSnapshot,
    redirections_inactive: bool,
) -> ReconciliationDecision {
    if !snapshot.physical_complete() {
        return ReconciliationDecision::WaitForHardware {
            reason: format!(
                "physical headset {} missing",
                snapshot.missing_physical().join(" and ")
            ),
        };
    }

    if !snapshot.virtual_complete() {
        return ReconciliationDecision::TriggerReset {
            reason: format!(
                "virtual devices missing: {}",
                snapshot.missing_virtual().join(", ")
            ),
        };
    }

    if redirections_inactive {
        return ReconciliationDecision::TriggerReset {
            reason: "one or more redirections are not running".to_string(),
        };
    }

    ReconciliationDecision::NoAction
}
