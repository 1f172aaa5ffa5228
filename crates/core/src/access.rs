//! Access policy.
//!
//! Analytics views call [`authorize`] before any query runs. Patients are narrowed to their own
//! record; clinical staff see whatever they ask for. List and create views use the ownership
//! helpers below instead, which never narrow a request and never answer 403 for somebody
//! else's id.

use crate::models::{Actor, Role};
use mhr_types::PatientId;

/// Outcome of an analytics access check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    /// Proceed, filtering by `effective_patient` (`None` means every patient).
    Allowed { effective_patient: Option<PatientId> },
    Forbidden,
    /// The actor is a patient with no patient profile.
    NotFound,
}

/// Decide whether `actor` may read analytics for `requested`.
pub fn authorize(actor: &Actor, requested: Option<PatientId>) -> AccessDecision {
    let decision = match actor.role {
        Role::Doctor | Role::Nurse | Role::Admin => AccessDecision::Allowed {
            effective_patient: requested,
        },
        Role::Patient => match actor.patient_id {
            None => AccessDecision::NotFound,
            Some(own) => match requested {
                None => AccessDecision::Allowed {
                    effective_patient: Some(own),
                },
                Some(id) if id == own => AccessDecision::Allowed {
                    effective_patient: Some(own),
                },
                Some(_) => AccessDecision::Forbidden,
            },
        },
    };

    if !matches!(decision, AccessDecision::Allowed { .. }) {
        tracing::warn!(
            user_id = %actor.user_id,
            role = %actor.role,
            requested_patient = ?requested.map(PatientId::get),
            ?decision,
            "analytics access denied"
        );
    }

    decision
}

/// Whether a row owned by `owner` appears in `actor`'s list views.
pub fn visible_to(actor: &Actor, owner: PatientId) -> bool {
    match actor.role {
        Role::Doctor | Role::Nurse | Role::Admin => true,
        Role::Patient => actor.patient_id == Some(owner),
    }
}

/// Whether `actor` may create clinical records or patient profiles.
pub fn can_author(actor: &Actor) -> bool {
    !actor.is_patient()
}
