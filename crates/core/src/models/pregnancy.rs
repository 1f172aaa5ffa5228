use crate::aggregate::AggregateReport;
use crate::kind::{ClinicalRecord, ExportValue, RecordKind};
use crate::store::Records;
use api_shared::wire::PregnancySummaryRes;
use chrono::NaiveDate;
use mhr_types::{DeliveryId, PatientId, PregnancyId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub fn as_str(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pregnancy {
    pub id: PregnancyId,
    pub patient_id: PatientId,
    pub gestational_age_weeks: u16,
    pub last_menstrual_period: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub hiv_status: bool,
    #[serde(default)]
    pub diabetes_status: bool,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// Request body for recording a pregnancy. The patient comes from the route.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPregnancy {
    pub gestational_age_weeks: u16,
    pub last_menstrual_period: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub hiv_status: bool,
    #[serde(default)]
    pub diabetes_status: bool,
}

impl NewPregnancy {
    pub fn into_pregnancy(
        self,
        id: PregnancyId,
        patient_id: PatientId,
        author: UserId,
    ) -> Pregnancy {
        Pregnancy {
            id,
            patient_id,
            gestational_age_weeks: self.gestational_age_weeks,
            last_menstrual_period: self.last_menstrual_period,
            expected_delivery_date: self.expected_delivery_date,
            blood_type: self.blood_type,
            hiv_status: self.hiv_status,
            diabetes_status: self.diabetes_status,
            created_by: Some(author),
            updated_by: Some(author),
        }
    }

    /// Replaces the clinical fields of `pregnancy`, keeping its id, patient and author.
    pub fn apply_to(self, pregnancy: &mut Pregnancy, editor: UserId) {
        pregnancy.gestational_age_weeks = self.gestational_age_weeks;
        pregnancy.last_menstrual_period = self.last_menstrual_period;
        pregnancy.expected_delivery_date = self.expected_delivery_date;
        pregnancy.blood_type = self.blood_type;
        pregnancy.hiv_status = self.hiv_status;
        pregnancy.diabetes_status = self.diabetes_status;
        pregnancy.updated_by = Some(editor);
    }
}

impl ClinicalRecord for Pregnancy {
    const KIND: RecordKind = RecordKind::Pregnancies;
    const METRICS: &'static [&'static str] = &["gestational_age_weeks"];
    const EXPORT_COLUMNS: &'static [&'static str] = &[
        "id",
        "patient",
        "gestational_age_weeks",
        "last_menstrual_period",
        "expected_delivery_date",
        "blood_type",
        "hiv_status",
        "diabetes_status",
        "created_by",
        "updated_by",
    ];

    type Summary = PregnancySummaryRes;

    fn rows(records: &Records) -> &[Self] {
        &records.pregnancies
    }

    fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    fn pregnancy_link(&self) -> Option<PregnancyId> {
        Some(self.id)
    }

    fn delivery_link(&self) -> Option<DeliveryId> {
        None
    }

    fn category(&self) -> Option<&str> {
        self.blood_type.map(BloodType::as_str)
    }

    fn metric(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(f64::from(self.gestational_age_weeks)),
            _ => None,
        }
    }

    fn period(&self) -> Option<NaiveDate> {
        self.expected_delivery_date
    }

    fn export_row(&self) -> Vec<ExportValue> {
        vec![
            ExportValue::Ref(self.id.get()),
            ExportValue::Ref(self.patient_id.get()),
            ExportValue::Integer(i64::from(self.gestational_age_weeks)),
            ExportValue::optional_date(self.last_menstrual_period),
            ExportValue::optional_date(self.expected_delivery_date),
            ExportValue::optional_text(self.blood_type.map(BloodType::as_str)),
            ExportValue::Bool(self.hiv_status),
            ExportValue::Bool(self.diabetes_status),
            ExportValue::optional_ref(self.created_by.map(UserId::get)),
            ExportValue::optional_ref(self.updated_by.map(UserId::get)),
        ]
    }

    fn summarise(report: AggregateReport) -> PregnancySummaryRes {
        PregnancySummaryRes {
            total_pregnancies: report.total,
            average_gestational_age_weeks: report.average("gestational_age_weeks"),
            monthly_pregnancies: report.monthly_wire(),
            by_blood_type: report.grouped_counts,
        }
    }
}
