//! Credit-based admission for chat turns.

use crate::core::identity::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditDecision {
    Allow,
    Deny,
}

/// Decides whether a turn may reach the inference service.
///
/// Pure: nothing is reserved or debited here. Admins are always allowed; users need a positive
/// balance in the snapshot fetched for this turn.
pub fn decide(role: Role, credits: u64) -> CreditDecision {
    match role {
        Role::Admin | Role::SuperAdmin => CreditDecision::Allow,
        Role::User if credits > 0 => CreditDecision::Allow,
        Role::User => CreditDecision::Deny,
    }
}
