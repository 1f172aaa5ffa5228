//! Record service.
//!
//! List, retrieve and create operations over the store. List views are ownership-filtered:
//! a patient only ever sees rows belonging to their own profile, whatever identifiers the
//! request carries. Creating records is reserved for clinical staff.

use crate::access::{can_author, visible_to};
use crate::models::{
    Actor, Delivery, NewDelivery, NewPatient, NewPregnancy, NewVisit, Pregnancy, Role, Visit,
};
use crate::scope::{resolve, NestingPolicy, Scope};
use crate::store::{RecordStore, Records};
use crate::validation::{
    validate_new_delivery, validate_new_patient, validate_new_pregnancy, validate_new_visit,
    FieldErrors,
};
use crate::{RecordsError, RecordsResult};
use api_shared::wire::PatientRes;
use chrono::{NaiveDate, Utc};
use mhr_types::{DeliveryId, PatientId, PregnancyId, VisitId};
use std::sync::Arc;

const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
const MISSING_OBJECT: &str = "Invalid pk - object does not exist.";
const READ_ONLY_LINK: &str = "This field cannot be changed once recorded.";

/// Date a pregnancy list is sorted by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PregnancyOrderField {
    #[default]
    ExpectedDeliveryDate,
    LastMenstrualPeriod,
}

/// Sort order of the pregnancy list. Undated rows sort last ascending and first descending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PregnancyOrdering {
    pub field: PregnancyOrderField,
    pub descending: bool,
}

impl PregnancyOrdering {
    /// Reads an `ordering` query value such as `last_menstrual_period` or
    /// `-expected_delivery_date`. Anything else keeps the default order.
    pub fn from_query(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };
        let (descending, name) = match value.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, value),
        };
        let field = match name {
            "expected_delivery_date" => PregnancyOrderField::ExpectedDeliveryDate,
            "last_menstrual_period" => PregnancyOrderField::LastMenstrualPeriod,
            _ => return Self::default(),
        };
        Self { field, descending }
    }

    fn key(self, pregnancy: &Pregnancy) -> Option<NaiveDate> {
        match self.field {
            PregnancyOrderField::ExpectedDeliveryDate => pregnancy.expected_delivery_date,
            PregnancyOrderField::LastMenstrualPeriod => pregnancy.last_menstrual_period,
        }
    }

    fn sort(self, rows: &mut [Pregnancy]) {
        rows.sort_by_key(|p| {
            let key = self.key(p);
            (key.is_none(), key)
        });
        if self.descending {
            rows.reverse();
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordService {
    store: Arc<RecordStore>,
    policy: NestingPolicy,
}

impl RecordService {
    pub fn new(store: Arc<RecordStore>, policy: NestingPolicy) -> Self {
        Self { store, policy }
    }

    pub fn list_patients(&self, actor: &Actor) -> RecordsResult<Vec<PatientRes>> {
        let today = Utc::now().date_naive();
        self.store.read(|records| {
            records
                .patients
                .iter()
                .filter(|p| visible_to(actor, p.id))
                .map(|p| patient_wire(records, p.id, today))
                .collect()
        })?
    }

    /// # Errors
    ///
    /// Returns `NotFound` for a patient that does not exist or is not visible to `actor`.
    pub fn get_patient(&self, actor: &Actor, id: PatientId) -> RecordsResult<PatientRes> {
        let today = Utc::now().date_naive();
        self.store.read(|records| {
            if !visible_to(actor, id) || records.patient(id).is_none() {
                return Err(RecordsError::NotFound("Patient"));
            }
            patient_wire(records, id, today)
        })?
    }

    pub fn create_patient(&self, actor: &Actor, new: NewPatient) -> RecordsResult<PatientRes> {
        ensure_author(actor)?;
        validate_new_patient(&new)?;
        let today = Utc::now().date_naive();

        let id = self.store.write(|records| {
            let mut errors = FieldErrors::new();
            match records.user(new.user_id) {
                None => errors.add("user_id", MISSING_OBJECT),
                Some(user) if user.role().ok() != Some(Role::Patient) => {
                    errors.add("user_id", "User must have the patient role.")
                }
                Some(_) if records.patient_for_user(new.user_id).is_some() => {
                    errors.add("user_id", "This user already has a patient profile.")
                }
                Some(_) => {}
            }
            if records
                .patients
                .iter()
                .any(|p| p.medical_record_number == new.medical_record_number)
            {
                errors.add(
                    "medical_record_number",
                    "patient with this medical record number already exists.",
                );
            }
            if records.patients.iter().any(|p| p.national_id == new.national_id) {
                errors.add("national_id", "patient with this national id already exists.");
            }
            errors.into_result()?;

            let id = records.next_patient_id()?;
            records.patients.push(new.into_patient(id));
            Ok(id)
        })?;

        tracing::info!(patient_id = %id, author = %actor.user_id, "created patient profile");
        self.store.read(|records| patient_wire(records, id, today))?
    }

    /// Pregnancies visible to `actor`, optionally limited to one patient and filtered by a
    /// case-insensitive `search` over the patient's name and the blood type.
    pub fn list_pregnancies(
        &self,
        actor: &Actor,
        patient: Option<PatientId>,
        search: Option<&str>,
        ordering: PregnancyOrdering,
    ) -> RecordsResult<Vec<Pregnancy>> {
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.store.read(|records| {
            let mut rows: Vec<Pregnancy> = records
                .pregnancies
                .iter()
                .filter(|p| visible_to(actor, p.patient_id))
                .filter(|p| patient.map_or(true, |id| p.patient_id == id))
                .filter(|p| {
                    needle
                        .as_deref()
                        .map_or(true, |n| pregnancy_matches(records, p, n))
                })
                .cloned()
                .collect();
            ordering.sort(&mut rows);
            rows
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` for a pregnancy that does not exist or is not visible to `actor`.
    pub fn get_pregnancy(&self, actor: &Actor, id: PregnancyId) -> RecordsResult<Pregnancy> {
        self.store.read(|records| {
            records
                .pregnancy(id)
                .filter(|p| visible_to(actor, p.patient_id))
                .cloned()
                .ok_or(RecordsError::NotFound("Pregnancy"))
        })?
    }

    pub fn create_pregnancy(
        &self,
        actor: &Actor,
        patient: PatientId,
        new: NewPregnancy,
    ) -> RecordsResult<Pregnancy> {
        ensure_author(actor)?;
        validate_new_pregnancy(&new)?;

        let created = self.store.write(|records| {
            if records.patient(patient).is_none() {
                return Err(RecordsError::NotFound("Patient"));
            }
            let id = records.next_pregnancy_id()?;
            let pregnancy = new.into_pregnancy(id, patient, actor.user_id);
            records.pregnancies.push(pregnancy.clone());
            Ok(pregnancy)
        })?;

        tracing::info!(pregnancy_id = %created.id, patient_id = %patient, "created pregnancy");
        Ok(created)
    }

    /// Replaces the clinical fields of a pregnancy and stamps the editor.
    pub fn update_pregnancy(
        &self,
        actor: &Actor,
        id: PregnancyId,
        new: NewPregnancy,
    ) -> RecordsResult<Pregnancy> {
        ensure_author(actor)?;
        validate_new_pregnancy(&new)?;

        let updated = self.store.write(|records| {
            let pregnancy = records
                .pregnancies
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(RecordsError::NotFound("Pregnancy"))?;
            new.apply_to(pregnancy, actor.user_id);
            Ok(pregnancy.clone())
        })?;

        tracing::info!(pregnancy_id = %id, editor = %actor.user_id, "updated pregnancy");
        Ok(updated)
    }

    /// Deletes a pregnancy together with its deliveries and the visits linked to it. Visits
    /// that pointed at a removed delivery keep their other links.
    pub fn delete_pregnancy(&self, actor: &Actor, id: PregnancyId) -> RecordsResult<()> {
        ensure_author(actor)?;

        self.store.write(|records| {
            if records.pregnancy(id).is_none() {
                return Err(RecordsError::NotFound("Pregnancy"));
            }
            records.pregnancies.retain(|p| p.id != id);
            let removed: Vec<DeliveryId> = records
                .deliveries
                .iter()
                .filter(|d| d.pregnancy_id == id)
                .map(|d| d.id)
                .collect();
            records.deliveries.retain(|d| d.pregnancy_id != id);
            records.visits.retain(|v| v.pregnancy_id != Some(id));
            for visit in &mut records.visits {
                if visit.delivery_id.is_some_and(|d| removed.contains(&d)) {
                    visit.delivery_id = None;
                }
            }
            Ok(())
        })?;

        tracing::info!(pregnancy_id = %id, editor = %actor.user_id, "deleted pregnancy");
        Ok(())
    }

    pub fn list_deliveries(&self, actor: &Actor, scope: Scope) -> RecordsResult<Vec<Delivery>> {
        let policy = self.policy;
        self.store.read(|records| {
            resolve(&scope, records, policy)
                .select::<Delivery>(records)
                .filter(|d| visible_to(actor, d.patient_id))
                .cloned()
                .collect()
        })
    }

    /// Records a delivery. The owning patient is always the pregnancy's patient; a patient
    /// given in the route or body that differs is a validation error on `pregnancy`.
    pub fn create_delivery(
        &self,
        actor: &Actor,
        patient: Option<PatientId>,
        new: NewDelivery,
    ) -> RecordsResult<Delivery> {
        ensure_author(actor)?;
        validate_new_delivery(&new)?;
        let expected_patient = patient.or(new.patient_id);

        let created = self.store.write(|records| {
            let owner = match records.pregnancy(new.pregnancy_id) {
                Some(p) => p.patient_id,
                None => return Err(field_error("pregnancy", MISSING_OBJECT)),
            };
            if expected_patient.is_some_and(|id| id != owner) {
                return Err(field_error(
                    "pregnancy",
                    "Pregnancy does not belong to the selected patient.",
                ));
            }
            let id = records.next_delivery_id()?;
            let delivery = new.into_delivery(id, owner, actor.user_id, Utc::now());
            records.deliveries.push(delivery.clone());
            Ok(delivery)
        })?;

        tracing::info!(
            delivery_id = %created.id,
            patient_id = %created.patient_id,
            "created delivery"
        );
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for a delivery that does not exist or is not visible to `actor`.
    pub fn get_delivery(&self, actor: &Actor, id: DeliveryId) -> RecordsResult<Delivery> {
        self.store.read(|records| {
            records
                .delivery(id)
                .filter(|d| visible_to(actor, d.patient_id))
                .cloned()
                .ok_or(RecordsError::NotFound("Delivery"))
        })?
    }

    /// Replaces the outcome fields of a delivery. The body must name the pregnancy (and, if
    /// given, the patient) the delivery was recorded against.
    pub fn update_delivery(
        &self,
        actor: &Actor,
        id: DeliveryId,
        new: NewDelivery,
    ) -> RecordsResult<Delivery> {
        ensure_author(actor)?;
        validate_new_delivery(&new)?;

        let updated = self.store.write(|records| {
            let delivery = records
                .deliveries
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or(RecordsError::NotFound("Delivery"))?;

            let mut errors = FieldErrors::new();
            if new.pregnancy_id != delivery.pregnancy_id {
                errors.add("pregnancy", READ_ONLY_LINK);
            }
            if new.patient_id.is_some_and(|p| p != delivery.patient_id) {
                errors.add("patient", READ_ONLY_LINK);
            }
            errors.into_result()?;

            new.apply_to(delivery, actor.user_id, Utc::now());
            Ok(delivery.clone())
        })?;

        tracing::info!(delivery_id = %id, editor = %actor.user_id, "updated delivery");
        Ok(updated)
    }

    /// Deletes a delivery. Visits linked to it are kept without the delivery link.
    pub fn delete_delivery(&self, actor: &Actor, id: DeliveryId) -> RecordsResult<()> {
        ensure_author(actor)?;

        self.store.write(|records| {
            if records.delivery(id).is_none() {
                return Err(RecordsError::NotFound("Delivery"));
            }
            records.deliveries.retain(|d| d.id != id);
            for visit in &mut records.visits {
                if visit.delivery_id == Some(id) {
                    visit.delivery_id = None;
                }
            }
            Ok(())
        })?;

        tracing::info!(delivery_id = %id, editor = %actor.user_id, "deleted delivery");
        Ok(())
    }

    pub fn list_visits(&self, actor: &Actor, scope: Scope) -> RecordsResult<Vec<Visit>> {
        let policy = self.policy;
        self.store.read(|records| {
            resolve(&scope, records, policy)
                .select::<Visit>(records)
                .filter(|v| visible_to(actor, v.patient_id))
                .cloned()
                .collect()
        })
    }

    /// Records a visit by `actor`. Route identifiers take precedence over those in the body.
    pub fn create_visit(
        &self,
        actor: &Actor,
        scope: Scope,
        new: NewVisit,
    ) -> RecordsResult<Visit> {
        ensure_author(actor)?;
        validate_new_visit(&new)?;
        let (Some(visit_type), Some(heart_rate)) = (new.visit_type, new.heart_rate) else {
            return Err(field_error("visit_type", "This field is required."));
        };

        let patient = scope.patient.or(new.patient_id);
        let pregnancy = scope.pregnancy.or(new.pregnancy_id);
        let delivery = scope.delivery.or(new.delivery_id);

        let created = self.store.write(|records| {
            let mut errors = FieldErrors::new();
            let patient = match patient {
                Some(id) if records.patient(id).is_some() => Some(id),
                Some(_) => {
                    errors.add("patient", MISSING_OBJECT);
                    None
                }
                None => {
                    errors.add("patient", "This field is required.");
                    None
                }
            };

            if let Some(id) = pregnancy {
                match records.pregnancy(id) {
                    None => errors.add("pregnancy", MISSING_OBJECT),
                    Some(p) if patient.is_some_and(|owner| p.patient_id != owner) => errors.add(
                        "pregnancy",
                        "Pregnancy does not belong to the selected patient.",
                    ),
                    Some(_) => {}
                }
            }
            if let Some(id) = delivery {
                match records.delivery(id) {
                    None => errors.add("delivery", MISSING_OBJECT),
                    Some(d) if patient.is_some_and(|owner| d.patient_id != owner) => errors.add(
                        "delivery",
                        "Delivery does not belong to the selected patient.",
                    ),
                    Some(_) => {}
                }
            }
            errors.into_result()?;
            let patient =
                patient.ok_or_else(|| field_error("patient", "This field is required."))?;

            let id = records.next_visit_id()?;
            let body = NewVisit {
                pregnancy_id: pregnancy,
                delivery_id: delivery,
                ..new
            };
            let visit = body.into_visit(
                id,
                patient,
                visit_type,
                heart_rate,
                actor.user_id,
                Utc::now(),
            );
            records.visits.push(visit.clone());
            Ok(visit)
        })?;

        tracing::info!(visit_id = %created.id, patient_id = %created.patient_id, "created visit");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for a visit that does not exist or is not visible to `actor`.
    pub fn get_visit(&self, actor: &Actor, id: VisitId) -> RecordsResult<Visit> {
        self.store.read(|records| {
            records
                .visits
                .iter()
                .find(|v| v.id == id)
                .filter(|v| visible_to(actor, v.patient_id))
                .cloned()
                .ok_or(RecordsError::NotFound("Visit"))
        })?
    }

    /// Replaces the measurements of a visit and stamps the editor. Links given in the body
    /// must match the recorded ones.
    pub fn update_visit(&self, actor: &Actor, id: VisitId, new: NewVisit) -> RecordsResult<Visit> {
        ensure_author(actor)?;
        validate_new_visit(&new)?;
        let (Some(visit_type), Some(heart_rate)) = (new.visit_type, new.heart_rate) else {
            return Err(field_error("visit_type", "This field is required."));
        };

        let updated = self.store.write(|records| {
            let visit = records
                .visits
                .iter_mut()
                .find(|v| v.id == id)
                .ok_or(RecordsError::NotFound("Visit"))?;

            let mut errors = FieldErrors::new();
            if new.patient_id.is_some_and(|p| p != visit.patient_id) {
                errors.add("patient", READ_ONLY_LINK);
            }
            if new.pregnancy_id.is_some() && new.pregnancy_id != visit.pregnancy_id {
                errors.add("pregnancy", READ_ONLY_LINK);
            }
            if new.delivery_id.is_some() && new.delivery_id != visit.delivery_id {
                errors.add("delivery", READ_ONLY_LINK);
            }
            errors.into_result()?;

            new.apply_to(visit, visit_type, heart_rate, actor.user_id, Utc::now());
            Ok(visit.clone())
        })?;

        tracing::info!(visit_id = %id, editor = %actor.user_id, "updated visit");
        Ok(updated)
    }

    pub fn delete_visit(&self, actor: &Actor, id: VisitId) -> RecordsResult<()> {
        ensure_author(actor)?;

        self.store.write(|records| {
            let before = records.visits.len();
            records.visits.retain(|v| v.id != id);
            if records.visits.len() == before {
                return Err(RecordsError::NotFound("Visit"));
            }
            Ok(())
        })?;

        tracing::info!(visit_id = %id, editor = %actor.user_id, "deleted visit");
        Ok(())
    }
}

fn ensure_author(actor: &Actor) -> RecordsResult<()> {
    if can_author(actor) {
        Ok(())
    } else {
        tracing::warn!(user_id = %actor.user_id, role = %actor.role, "write denied");
        Err(RecordsError::Forbidden(PERMISSION_DENIED))
    }
}

fn field_error(field: &str, message: &str) -> RecordsError {
    RecordsError::Validation(FieldErrors::single(field, message))
}

fn patient_wire(records: &Records, id: PatientId, today: NaiveDate) -> RecordsResult<PatientRes> {
    let patient = records
        .patient(id)
        .ok_or(RecordsError::NotFound("Patient"))?;
    let user = records
        .user(patient.user_id)
        .ok_or_else(|| RecordsError::Integrity(format!("patient {id} has no user account")))?;
    Ok(patient.to_wire(user, today))
}

fn pregnancy_matches(records: &Records, pregnancy: &Pregnancy, needle: &str) -> bool {
    let blood_type = pregnancy
        .blood_type
        .map(|b| b.as_str().to_lowercase())
        .unwrap_or_default();
    if blood_type.contains(needle) {
        return true;
    }
    records.patient(pregnancy.patient_id).is_some_and(|p| {
        p.first_name.to_lowercase().contains(needle) || p.last_name.to_lowercase().contains(needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, actor, delivery, patient_a, patient_b, patient_c, pregnancy};
    use crate::models::{DeliveryMode, VisitType};
    use mhr_types::UserId;

    fn service() -> (RecordService, Records) {
        let records = fixtures::records();
        let store = RecordStore::in_memory(records.clone()).expect("fixture store");
        (
            RecordService::new(Arc::new(store), NestingPolicy::default()),
            records,
        )
    }

    fn field_errors(err: RecordsError) -> FieldErrors {
        match err {
            RecordsError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn delivery_body(pregnancy_raw: u64) -> NewDelivery {
        NewDelivery {
            pregnancy_id: pregnancy(pregnancy_raw),
            patient_id: None,
            delivery_date: None,
            delivery_mode: DeliveryMode::Assisted,
            birth_weight_g: 2900,
            place_of_delivery: "Clinic".into(),
            skilled_birth_attendant: true,
            newborn_gender: "Female".into(),
            apgar_score_1min: 7,
            apgar_score_5min: 9,
            alive: true,
            congenital_anomalies: None,
            neonatal_complications: None,
            complications: None,
            interventions: None,
        }
    }

    fn visit_body() -> NewVisit {
        NewVisit {
            visit_type: Some(VisitType::Antenatal),
            heart_rate: Some(82),
            blood_pressure: "110/70".into(),
            ..NewVisit::default()
        }
    }

    #[test]
    fn patient_lists_only_own_profile() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_a");
        let rows = svc.list_patients(&patient).expect("list should succeed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, patient_a().get());
        assert_eq!(rows[0].username, "patient_a");

        let doctor = actor(&records, "doctor");
        assert_eq!(svc.list_patients(&doctor).unwrap().len(), 3);
    }

    #[test]
    fn patient_cannot_retrieve_other_profile() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_a");
        let err = svc
            .get_patient(&patient, patient_b())
            .expect_err("other profile is hidden");
        assert!(matches!(err, RecordsError::NotFound("Patient")));
    }

    #[test]
    fn create_patient_requires_patient_account_without_profile() {
        let (svc, records) = service();
        let admin = actor(&records, "admin");
        let mut new = NewPatient {
            user_id: UserId::new(3).unwrap(),
            first_name: "Doc".into(),
            last_name: "Tor".into(),
            medical_record_number: "MRN-NEW".into(),
            date_of_birth: None,
            address: String::new(),
            marital_status: String::new(),
            national_id: "NID-NEW".into(),
            phone_number: String::new(),
            educational_level: String::new(),
            occupation: String::new(),
            gravidity: 0,
            parity: 0,
            communication_language: String::new(),
        };
        let errors = field_errors(svc.create_patient(&admin, new.clone()).unwrap_err());
        assert!(errors.get("user_id").is_some(), "doctor account is not a patient");

        new.user_id = UserId::new(7).unwrap();
        let created = svc
            .create_patient(&admin, new)
            .expect("orphan account can get a profile");
        assert_eq!(created.username, "orphan");
        assert_eq!(created.id, 13);
    }

    #[test]
    fn patients_cannot_create_pregnancies() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_a");
        let new = NewPregnancy {
            gestational_age_weeks: 10,
            last_menstrual_period: None,
            expected_delivery_date: None,
            blood_type: None,
            hiv_status: false,
            diabetes_status: false,
        };
        let err = svc
            .create_pregnancy(&patient, patient_a(), new)
            .expect_err("patients may not author");
        assert!(matches!(err, RecordsError::Forbidden(_)));
    }

    #[test]
    fn create_pregnancy_for_missing_patient_is_not_found() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let new = NewPregnancy {
            gestational_age_weeks: 10,
            last_menstrual_period: None,
            expected_delivery_date: None,
            blood_type: None,
            hiv_status: false,
            diabetes_status: false,
        };
        let err = svc
            .create_pregnancy(&doctor, PatientId::new(404).unwrap(), new)
            .expect_err("patient 404 does not exist");
        assert!(matches!(err, RecordsError::NotFound("Patient")));
    }

    #[test]
    fn pregnancies_are_ordered_by_due_date_with_undated_last() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let ids: Vec<u64> = svc
            .list_pregnancies(&doctor, None, None, PregnancyOrdering::default())
            .unwrap()
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![5, 7, 6, 8]);
    }

    #[test]
    fn pregnancy_search_matches_name_and_blood_type() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let by_name = svc
            .list_pregnancies(&doctor, None, Some("SMITH"), PregnancyOrdering::default())
            .unwrap();
        assert_eq!(by_name.len(), 2);
        let by_blood = svc
            .list_pregnancies(&doctor, None, Some("o+"), PregnancyOrdering::default())
            .unwrap();
        assert_eq!(by_blood.len(), 1);
        assert_eq!(by_blood[0].id, pregnancy(5));
    }

    #[test]
    fn patient_pregnancy_list_ignores_foreign_patient_filter() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_a");
        let rows = svc
            .list_pregnancies(&patient, Some(patient_b()), None, PregnancyOrdering::default())
            .expect("no 403 on list views");
        assert!(rows.is_empty());
    }

    #[test]
    fn delivery_patient_is_taken_from_pregnancy() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let created = svc
            .create_delivery(&doctor, None, delivery_body(8))
            .expect("delivery should be created");
        assert_eq!(created.patient_id, patient_b());
        assert_eq!(created.id, delivery(4));
        assert_eq!(created.created_by, Some(doctor.user_id));
    }

    #[test]
    fn delivery_for_other_patients_pregnancy_is_rejected() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let err = svc
            .create_delivery(&doctor, Some(patient_a()), delivery_body(8))
            .expect_err("pregnancy 8 belongs to patient B");
        let errors = field_errors(err);
        assert!(errors.get("pregnancy").is_some());
    }

    #[test]
    fn nested_delivery_list_respects_pregnancy() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let scope = Scope {
            patient: Some(patient_a()),
            pregnancy: Some(pregnancy(6)),
            delivery: None,
        };
        let rows = svc.list_deliveries(&doctor, scope).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, delivery(2));
    }

    #[test]
    fn visit_links_must_belong_to_visit_patient() {
        let (svc, records) = service();
        let nurse = actor(&records, "nurse");
        let new = NewVisit {
            pregnancy_id: Some(pregnancy(7)),
            delivery_id: Some(delivery(1)),
            ..visit_body()
        };
        let err = svc
            .create_visit(&nurse, Scope::patient(patient_c()), new)
            .expect_err("links belong to other patients");
        let errors = field_errors(err);
        assert!(errors.get("pregnancy").is_some());
        assert!(errors.get("delivery").is_some());
    }

    #[test]
    fn visit_provider_is_the_actor() {
        let (svc, records) = service();
        let nurse = actor(&records, "nurse");
        let scope = Scope {
            patient: Some(patient_a()),
            pregnancy: Some(pregnancy(6)),
            delivery: None,
        };
        let created = svc
            .create_visit(&nurse, scope, visit_body())
            .expect("visit should be created");
        assert_eq!(created.provider_id, nurse.user_id);
        assert_eq!(created.pregnancy_id, Some(pregnancy(6)));

        let visits = svc.list_visits(&nurse, Scope::patient(patient_a())).unwrap();
        assert_eq!(visits.len(), 4);
    }

    #[test]
    fn patients_cannot_create_visits() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_a");
        let err = svc
            .create_visit(&patient, Scope::patient(patient_a()), visit_body())
            .expect_err("visits are read-only for patients");
        assert!(matches!(err, RecordsError::Forbidden(_)));
    }

    #[test]
    fn patient_visit_list_is_ownership_filtered() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_b");
        let rows = svc.list_visits(&patient, Scope::global()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|v| v.patient_id == patient_b()));
    }

    fn visit(raw: u64) -> VisitId {
        VisitId::new(raw).unwrap()
    }

    #[test]
    fn pregnancy_ordering_reads_query_values() {
        assert_eq!(PregnancyOrdering::from_query(None), PregnancyOrdering::default());
        assert_eq!(
            PregnancyOrdering::from_query(Some("-last_menstrual_period")),
            PregnancyOrdering {
                field: PregnancyOrderField::LastMenstrualPeriod,
                descending: true,
            }
        );
        assert_eq!(
            PregnancyOrdering::from_query(Some("gestational_age_weeks")),
            PregnancyOrdering::default(),
            "unsupported fields keep the default order"
        );
    }

    #[test]
    fn pregnancies_can_be_ordered_by_last_period_descending() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let ordering = PregnancyOrdering::from_query(Some("-last_menstrual_period"));
        let ids: Vec<u64> = svc
            .list_pregnancies(&doctor, None, None, ordering)
            .unwrap()
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![8, 6, 7, 5]);
    }

    #[test]
    fn patient_cannot_retrieve_other_patients_records() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_a");
        assert!(matches!(
            svc.get_visit(&patient, visit(4)),
            Err(RecordsError::NotFound("Visit"))
        ));
        assert!(matches!(
            svc.get_pregnancy(&patient, pregnancy(7)),
            Err(RecordsError::NotFound("Pregnancy"))
        ));
        assert!(matches!(
            svc.get_delivery(&patient, delivery(3)),
            Err(RecordsError::NotFound("Delivery"))
        ));

        let own = svc.get_visit(&patient, visit(1)).expect("own visit is visible");
        assert_eq!(own.patient_id, patient_a());
    }

    #[test]
    fn pregnancy_update_stamps_editor() {
        let (svc, records) = service();
        let nurse = actor(&records, "nurse");
        let new = NewPregnancy {
            gestational_age_weeks: 24,
            last_menstrual_period: None,
            expected_delivery_date: None,
            blood_type: None,
            hiv_status: true,
            diabetes_status: false,
        };
        let updated = svc
            .update_pregnancy(&nurse, pregnancy(6), new)
            .expect("update should succeed");
        assert_eq!(updated.gestational_age_weeks, 24);
        assert_eq!(updated.patient_id, patient_a());
        assert_eq!(updated.updated_by, Some(nurse.user_id));
        assert!(updated.hiv_status);
    }

    #[test]
    fn delivery_update_keeps_links_and_stamps_editor() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        let before = svc.get_delivery(&doctor, delivery(1)).unwrap();

        let updated = svc
            .update_delivery(&doctor, delivery(1), delivery_body(5))
            .expect("update should succeed");
        assert_eq!(updated.delivery_mode, DeliveryMode::Assisted);
        assert_eq!(updated.delivery_date, before.delivery_date);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(updated.updated_by, Some(doctor.user_id));

        let err = svc
            .update_delivery(&doctor, delivery(1), delivery_body(6))
            .expect_err("pregnancy link is fixed");
        assert!(field_errors(err).get("pregnancy").is_some());
    }

    #[test]
    fn visit_update_stamps_editor_and_rejects_relinking() {
        let (svc, records) = service();
        let nurse = actor(&records, "nurse");
        let updated = svc
            .update_visit(&nurse, visit(1), visit_body())
            .expect("update should succeed");
        assert_eq!(updated.heart_rate, 82);
        assert_eq!(updated.provider_id, UserId::new(3).unwrap());
        assert_eq!(updated.updated_by, Some(nurse.user_id));
        assert_eq!(updated.pregnancy_id, Some(pregnancy(5)));

        let relink = NewVisit {
            pregnancy_id: Some(pregnancy(6)),
            ..visit_body()
        };
        let err = svc
            .update_visit(&nurse, visit(1), relink)
            .expect_err("pregnancy link is fixed");
        assert!(field_errors(err).get("pregnancy").is_some());
    }

    #[test]
    fn patients_cannot_update_or_delete() {
        let (svc, records) = service();
        let patient = actor(&records, "patient_a");
        assert!(matches!(
            svc.update_visit(&patient, visit(1), visit_body()),
            Err(RecordsError::Forbidden(_))
        ));
        assert!(matches!(
            svc.delete_delivery(&patient, delivery(1)),
            Err(RecordsError::Forbidden(_))
        ));
    }

    #[test]
    fn deleting_pregnancy_cascades_to_deliveries_and_visits() {
        let (svc, records) = service();
        let admin = actor(&records, "admin");
        svc.delete_pregnancy(&admin, pregnancy(5))
            .expect("delete should succeed");

        let deliveries = svc.list_deliveries(&admin, Scope::global()).unwrap();
        assert!(deliveries.iter().all(|d| d.id != delivery(1)));
        let visits: Vec<u64> = svc
            .list_visits(&admin, Scope::global())
            .unwrap()
            .iter()
            .map(|v| v.id.get())
            .collect();
        assert_eq!(visits, vec![3, 4, 5]);

        assert!(matches!(
            svc.delete_pregnancy(&admin, pregnancy(5)),
            Err(RecordsError::NotFound("Pregnancy"))
        ));
    }

    #[test]
    fn deleting_delivery_unlinks_visits() {
        let (svc, records) = service();
        let doctor = actor(&records, "doctor");
        svc.delete_delivery(&doctor, delivery(3))
            .expect("delete should succeed");
        let unlinked = svc.get_visit(&doctor, visit(5)).unwrap();
        assert_eq!(unlinked.delivery_id, None);
        assert_eq!(unlinked.pregnancy_id, Some(pregnancy(7)));
    }

    #[test]
    fn deleting_visit_removes_only_that_visit() {
        let (svc, records) = service();
        let nurse = actor(&records, "nurse");
        svc.delete_visit(&nurse, visit(3)).expect("delete should succeed");
        assert!(matches!(
            svc.get_visit(&nurse, visit(3)),
            Err(RecordsError::NotFound("Visit"))
        ));
        assert_eq!(svc.list_visits(&nurse, Scope::global()).unwrap().len(), 4);
    }
}
