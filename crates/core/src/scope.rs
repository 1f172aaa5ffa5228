//! Scope resolution.
//!
//! A [`Scope`] is the optional `{patient, pregnancy, delivery}` triple taken from the request
//! path. [`resolve`] checks that the supplied identifiers nest consistently and turns the scope
//! into a [`ResolvedScope`]: either a predicate over the rows of one record kind, or `Empty`
//! when the identifiers do not belong together.
//!
//! A mismatch is "no visible records", never an error, so the response does not reveal whether
//! the mismatched pregnancy or delivery exists.

use crate::kind::ClinicalRecord;
use crate::store::Records;
use crate::RecordsError;
use mhr_types::{DeliveryId, PatientId, PregnancyId};
use std::fmt;
use std::str::FromStr;

/// Request-time scope built from path parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    pub patient: Option<PatientId>,
    pub pregnancy: Option<PregnancyId>,
    pub delivery: Option<DeliveryId>,
}

impl Scope {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn patient(patient: PatientId) -> Self {
        Self {
            patient: Some(patient),
            ..Self::default()
        }
    }

    pub fn with_patient(self, patient: Option<PatientId>) -> Self {
        Self { patient, ..self }
    }
}

/// How strictly nested identifiers are cross-checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NestingPolicy {
    /// Pregnancy and delivery are each checked against the patient, when a patient is given.
    /// A delivery or pregnancy without a patient is not checked at all.
    #[default]
    PairwiseOwnership,
    /// Additionally requires referenced records to exist, and a delivery to belong to the
    /// referenced pregnancy.
    FullChain,
}

impl fmt::Display for NestingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestingPolicy::PairwiseOwnership => f.write_str("pairwise"),
            NestingPolicy::FullChain => f.write_str("full-chain"),
        }
    }
}

impl FromStr for NestingPolicy {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pairwise" => Ok(NestingPolicy::PairwiseOwnership),
            "full-chain" | "full_chain" => Ok(NestingPolicy::FullChain),
            other => Err(RecordsError::InvalidInput(format!(
                "unknown nesting policy: {other} (expected 'pairwise' or 'full-chain')"
            ))),
        }
    }
}

/// Row predicate for a resolved scope. Every supplied identifier must match the row's link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    patient: Option<PatientId>,
    pregnancy: Option<PregnancyId>,
    delivery: Option<DeliveryId>,
}

impl ScopeFilter {
    pub fn matches<R: ClinicalRecord>(&self, record: &R) -> bool {
        self.patient.map_or(true, |p| record.patient_id() == p)
            && self
                .pregnancy
                .map_or(true, |p| record.pregnancy_link() == Some(p))
            && self
                .delivery
                .map_or(true, |d| record.delivery_link() == Some(d))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedScope {
    Empty,
    Filter(ScopeFilter),
}

impl ResolvedScope {
    /// Lazily yields the rows of kind `R` inside this scope.
    pub fn select<'a, R: ClinicalRecord + 'a>(
        &self,
        records: &'a Records,
    ) -> impl Iterator<Item = &'a R> + 'a {
        let filter = match self {
            ResolvedScope::Empty => None,
            ResolvedScope::Filter(filter) => Some(*filter),
        };
        R::rows(records)
            .iter()
            .filter(move |row| filter.is_some_and(|f| f.matches(*row)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResolvedScope::Empty)
    }
}

/// Validate nesting and build the row predicate for `scope`.
pub fn resolve(scope: &Scope, records: &Records, policy: NestingPolicy) -> ResolvedScope {
    let nested_ok = match policy {
        NestingPolicy::PairwiseOwnership => pairwise_consistent(scope, records),
        NestingPolicy::FullChain => {
            pairwise_consistent(scope, records) && chain_consistent(scope, records)
        }
    };

    if !nested_ok {
        tracing::debug!(?scope, %policy, "scope identifiers do not nest; resolving to empty");
        return ResolvedScope::Empty;
    }

    ResolvedScope::Filter(ScopeFilter {
        patient: scope.patient,
        pregnancy: scope.pregnancy,
        delivery: scope.delivery,
    })
}

fn pairwise_consistent(scope: &Scope, records: &Records) -> bool {
    let Some(patient) = scope.patient else {
        return true;
    };

    let pregnancy_ok = scope.pregnancy.map_or(true, |id| {
        records
            .pregnancy(id)
            .is_some_and(|p| p.patient_id == patient)
    });
    let delivery_ok = scope.delivery.map_or(true, |id| {
        records.delivery(id).is_some_and(|d| d.patient_id == patient)
    });

    pregnancy_ok && delivery_ok
}

fn chain_consistent(scope: &Scope, records: &Records) -> bool {
    let pregnancy = match scope.pregnancy {
        Some(id) => match records.pregnancy(id) {
            Some(p) => Some(p),
            None => return false,
        },
        None => None,
    };
    let delivery = match scope.delivery {
        Some(id) => match records.delivery(id) {
            Some(d) => Some(d),
            None => return false,
        },
        None => None,
    };

    match (pregnancy, delivery) {
        (Some(p), Some(d)) => d.pregnancy_id == p.id,
        _ => true,
    }
}
