//! Analytics service.
//!
//! Runs the summary and export pipelines: access check, scope resolution, then aggregation or
//! export, all against one store snapshot.

use crate::access::{authorize, AccessDecision};
use crate::aggregate::aggregate;
use crate::export::{export, ExportTable};
use crate::kind::ClinicalRecord;
use crate::models::Actor;
use crate::scope::{resolve, NestingPolicy, ResolvedScope, Scope};
use crate::store::{RecordStore, Records};
use crate::{RecordsError, RecordsResult};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AnalyticsService {
    store: Arc<RecordStore>,
    policy: NestingPolicy,
}

impl AnalyticsService {
    pub fn new(store: Arc<RecordStore>, policy: NestingPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> NestingPolicy {
        self.policy
    }

    /// Summary of the records of kind `R` visible to `actor` within `scope`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if a patient asks for another patient's records
    /// - `PatientProfileNotFound` if a patient actor has no patient profile
    pub fn summary<R: ClinicalRecord>(
        &self,
        actor: &Actor,
        scope: Scope,
    ) -> RecordsResult<R::Summary> {
        let policy = self.policy;
        self.store.read(|records| {
            let resolved = authorized_scope(actor, scope, records, policy)?;
            let report = aggregate(resolved.select::<R>(records));
            tracing::debug!(kind = %R::KIND, total = report.total, "computed summary");
            Ok(R::summarise(report))
        })?
    }

    /// Export table of the records of kind `R` visible to `actor` within `scope`.
    ///
    /// # Errors
    ///
    /// As [`AnalyticsService::summary`], plus `NoRecords` when the resolved set is empty.
    pub fn export<R: ClinicalRecord>(
        &self,
        actor: &Actor,
        scope: Scope,
    ) -> RecordsResult<ExportTable> {
        let policy = self.policy;
        self.store.read(|records| {
            let resolved = authorized_scope(actor, scope, records, policy)?;
            export(resolved.select::<R>(records))
        })?
    }
}

fn authorized_scope(
    actor: &Actor,
    scope: Scope,
    records: &Records,
    policy: NestingPolicy,
) -> RecordsResult<ResolvedScope> {
    let effective_patient = match authorize(actor, scope.patient) {
        AccessDecision::Allowed { effective_patient } => effective_patient,
        AccessDecision::Forbidden => {
            return Err(RecordsError::Forbidden(
                "You do not have permission to perform this action.",
            ))
        }
        AccessDecision::NotFound => return Err(RecordsError::PatientProfileNotFound),
    };
    Ok(resolve(&scope.with_patient(effective_patient), records, policy))
}
