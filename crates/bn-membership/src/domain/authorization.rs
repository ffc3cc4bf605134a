//! Operator authorization guard
//!
//! Only the business network operator may change membership records. The
//! guard runs before any ledger side effect of a privileged flow.

use crate::error::{MembershipError, MembershipResult};
use shared_types::Party;

/// Fail with `NotAuthorized` unless `caller` is the configured operator.
///
/// Both name and owning key must match: a node advertising the operator's
/// name under a different key is not the operator.
pub fn authorize_operator(caller: &Party, operator: &Party) -> MembershipResult<()> {
    if caller == operator {
        return Ok(());
    }

    tracing::warn!(
        caller = %caller,
        caller_key = %caller.key_fingerprint(),
        operator = %operator,
        "[bn-membership] Rejected privileged flow from non-operator"
    );

    Err(MembershipError::NotAuthorized {
        caller: caller.to_string(),
        operator: operator.to_string(),
    })
}
