//! Request/response bodies exchanged with API clients.
//!
//! Field names are part of the public contract and must not change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of every non-validation error response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub detail: String,
}

/// One point of a monthly series.
///
/// `month` is the first day of the calendar month (`YYYY-MM-01`), or `null` for records
/// without a date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyCount {
    pub month: Option<String>,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliverySummaryRes {
    pub total_deliveries: u64,
    pub by_mode: BTreeMap<String, u64>,
    pub average_birth_weight_g: Option<f64>,
    pub monthly_deliveries: Vec<MonthlyCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PregnancySummaryRes {
    pub total_pregnancies: u64,
    pub by_blood_type: BTreeMap<String, u64>,
    pub average_gestational_age_weeks: Option<f64>,
    pub monthly_pregnancies: Vec<MonthlyCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisitSummaryRes {
    pub total_visits: u64,
    pub by_visit_type: BTreeMap<String, u64>,
    pub average_hemoglobin_level: Option<f64>,
    pub average_weight_kg: Option<f64>,
    pub monthly_visits: Vec<MonthlyCount>,
}

/// Patient profile as returned by the patients endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub medical_record_number: String,
    pub date_of_birth: Option<String>,
    pub age: Option<u32>,
    pub address: String,
    pub marital_status: String,
    pub national_id: String,
    pub phone_number: String,
    pub educational_level: String,
    pub occupation: String,
    pub gravidity: u16,
    pub parity: u16,
    pub communication_language: String,
}
