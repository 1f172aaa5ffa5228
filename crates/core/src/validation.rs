//! Input validation for record creation.
//!
//! Validators collect every problem with a request body into [`FieldErrors`], keyed by field
//! name, rather than stopping at the first one. Checks that need the rest of the store (links
//! to other records, uniqueness) live in the record service; this module only looks at the
//! body itself.

use crate::constants::{
    APGAR_SCORE, BIRTH_WEIGHT_G, FETAL_HEART_RATE, GESTATIONAL_AGE_WEEKS, HEART_RATE,
};
use crate::models::{NewDelivery, NewPatient, NewPregnancy, NewVisit};
use crate::{RecordsError, RecordsResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

/// Field-keyed validation messages, serialised as `{"<field>": ["message", ...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for a single-field failure.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, otherwise `RecordsError::Validation`.
    pub fn into_result(self) -> RecordsResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RecordsError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

fn check_range<T>(errors: &mut FieldErrors, field: &str, value: T, range: &RangeInclusive<T>)
where
    T: PartialOrd + fmt::Display,
{
    if !range.contains(&value) {
        errors.add(
            field,
            format!(
                "Ensure this value is between {} and {}.",
                range.start(),
                range.end()
            ),
        );
    }
}

fn check_required_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
    }
}

fn check_positive(errors: &mut FieldErrors, field: &str, value: Option<f64>) {
    if value.is_some_and(|v| !(v.is_finite() && v > 0.0)) {
        errors.add(field, "Ensure this value is greater than 0.");
    }
}

pub fn validate_new_patient(new: &NewPatient) -> RecordsResult<()> {
    let mut errors = FieldErrors::new();
    check_required_text(&mut errors, "medical_record_number", &new.medical_record_number);
    check_required_text(&mut errors, "national_id", &new.national_id);
    if new.parity > new.gravidity {
        errors.add("parity", "Parity cannot exceed gravidity.");
    }
    errors.into_result()
}

pub fn validate_new_pregnancy(new: &NewPregnancy) -> RecordsResult<()> {
    let mut errors = FieldErrors::new();
    check_range(
        &mut errors,
        "gestational_age_weeks",
        new.gestational_age_weeks,
        &GESTATIONAL_AGE_WEEKS,
    );
    let reversed = match (new.last_menstrual_period, new.expected_delivery_date) {
        (Some(lmp), Some(edd)) => edd < lmp,
        _ => false,
    };
    if reversed {
        errors.add(
            "expected_delivery_date",
            "Expected delivery date cannot precede the last menstrual period.",
        );
    }
    errors.into_result()
}

pub fn validate_new_delivery(new: &NewDelivery) -> RecordsResult<()> {
    let mut errors = FieldErrors::new();
    check_range(&mut errors, "birth_weight_g", new.birth_weight_g, &BIRTH_WEIGHT_G);
    check_range(&mut errors, "apgar_score_1min", new.apgar_score_1min, &APGAR_SCORE);
    check_range(&mut errors, "apgar_score_5min", new.apgar_score_5min, &APGAR_SCORE);
    check_required_text(&mut errors, "place_of_delivery", &new.place_of_delivery);
    check_required_text(&mut errors, "newborn_gender", &new.newborn_gender);
    errors.into_result()
}

pub fn validate_new_visit(new: &NewVisit) -> RecordsResult<()> {
    let mut errors = FieldErrors::new();
    if new.visit_type.is_none() {
        errors.add("visit_type", "This field is required.");
    }
    match new.heart_rate {
        Some(rate) => check_range(&mut errors, "heart_rate", rate, &HEART_RATE),
        None => errors.add("heart_rate", "This field is required."),
    }
    if let Some(rate) = new.fetal_heart_rate {
        check_range(&mut errors, "fetal_heart_rate", rate, &FETAL_HEART_RATE);
    }
    check_positive(&mut errors, "hemoglobin_level", new.hemoglobin_level);
    check_positive(&mut errors, "weight_kg", new.weight_kg);
    check_positive(&mut errors, "height_cm", new.height_cm);
    check_positive(&mut errors, "uterine_height_cm", new.uterine_height_cm);
    errors.into_result()
}
