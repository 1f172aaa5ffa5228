use crate::aggregate::AggregateReport;
use crate::kind::{ClinicalRecord, ExportValue, RecordKind};
use crate::store::Records;
use api_shared::wire::VisitSummaryRes;
use chrono::{DateTime, NaiveDate, Utc};
use mhr_types::{DeliveryId, PatientId, PregnancyId, UserId, VisitId};
use serde::{Deserialize, Serialize};

/// Kind of clinical visit. Legacy `ANC`/`PNC` codes are read as antenatal/postnatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitType {
    #[serde(alias = "ANC")]
    Antenatal,
    #[serde(alias = "PNC")]
    Postnatal,
    General,
}

impl VisitType {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitType::Antenatal => "Antenatal",
            VisitType::Postnatal => "Postnatal",
            VisitType::General => "General",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Visit {
    pub id: VisitId,
    pub patient_id: PatientId,
    pub provider_id: UserId,
    pub pregnancy_id: Option<PregnancyId>,
    pub delivery_id: Option<DeliveryId>,
    pub visit_date: DateTime<Utc>,
    pub visit_type: VisitType,
    pub blood_pressure: String,
    pub heart_rate: u16,
    pub hemoglobin_level: Option<f64>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,

    // Antenatal
    pub uterine_height_cm: Option<f64>,
    pub fetal_heart_rate: Option<u16>,
    pub fetal_movement_count: Option<u16>,
    pub fetal_weight_estimate_g: Option<u32>,

    // Postnatal
    pub breastfeeding_status: Option<bool>,
    pub postpartum_complications: Option<String>,
    pub newborn_health_issues: Option<String>,

    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub complications: Option<String>,
    pub interventions: Option<String>,
    pub referrals: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

/// Request body for recording a visit.
///
/// Links not present in the route may be given in the body; route values win.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewVisit {
    pub patient_id: Option<PatientId>,
    pub pregnancy_id: Option<PregnancyId>,
    pub delivery_id: Option<DeliveryId>,
    pub visit_date: Option<DateTime<Utc>>,
    pub visit_type: Option<VisitType>,
    #[serde(default)]
    pub blood_pressure: String,
    pub heart_rate: Option<u16>,
    pub hemoglobin_level: Option<f64>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub uterine_height_cm: Option<f64>,
    pub fetal_heart_rate: Option<u16>,
    pub fetal_movement_count: Option<u16>,
    pub fetal_weight_estimate_g: Option<u32>,
    pub breastfeeding_status: Option<bool>,
    pub postpartum_complications: Option<String>,
    pub newborn_health_issues: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub complications: Option<String>,
    pub interventions: Option<String>,
    pub referrals: Option<String>,
}

impl NewVisit {
    /// Builds the stored visit. Callers must have validated that `visit_type` and `heart_rate`
    /// are present and that `patient_id` is resolved.
    pub(crate) fn into_visit(
        self,
        id: VisitId,
        patient_id: PatientId,
        visit_type: VisitType,
        heart_rate: u16,
        provider: UserId,
        now: DateTime<Utc>,
    ) -> Visit {
        Visit {
            id,
            patient_id,
            provider_id: provider,
            pregnancy_id: self.pregnancy_id,
            delivery_id: self.delivery_id,
            visit_date: self.visit_date.unwrap_or(now),
            visit_type,
            blood_pressure: self.blood_pressure,
            heart_rate,
            hemoglobin_level: self.hemoglobin_level,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            uterine_height_cm: self.uterine_height_cm,
            fetal_heart_rate: self.fetal_heart_rate,
            fetal_movement_count: self.fetal_movement_count,
            fetal_weight_estimate_g: self.fetal_weight_estimate_g,
            breastfeeding_status: self.breastfeeding_status,
            postpartum_complications: self.postpartum_complications,
            newborn_health_issues: self.newborn_health_issues,
            follow_up_date: self.follow_up_date,
            notes: self.notes,
            complications: self.complications,
            interventions: self.interventions,
            referrals: self.referrals,
            created_at: now,
            updated_at: now,
            created_by: Some(provider),
            updated_by: Some(provider),
        }
    }

    /// Replaces the measurements of `visit`. Patient, pregnancy, delivery and provider stay as
    /// recorded.
    pub(crate) fn apply_to(
        self,
        visit: &mut Visit,
        visit_type: VisitType,
        heart_rate: u16,
        editor: UserId,
        now: DateTime<Utc>,
    ) {
        if let Some(date) = self.visit_date {
            visit.visit_date = date;
        }
        visit.visit_type = visit_type;
        visit.blood_pressure = self.blood_pressure;
        visit.heart_rate = heart_rate;
        visit.hemoglobin_level = self.hemoglobin_level;
        visit.weight_kg = self.weight_kg;
        visit.height_cm = self.height_cm;
        visit.uterine_height_cm = self.uterine_height_cm;
        visit.fetal_heart_rate = self.fetal_heart_rate;
        visit.fetal_movement_count = self.fetal_movement_count;
        visit.fetal_weight_estimate_g = self.fetal_weight_estimate_g;
        visit.breastfeeding_status = self.breastfeeding_status;
        visit.postpartum_complications = self.postpartum_complications;
        visit.newborn_health_issues = self.newborn_health_issues;
        visit.follow_up_date = self.follow_up_date;
        visit.notes = self.notes;
        visit.complications = self.complications;
        visit.interventions = self.interventions;
        visit.referrals = self.referrals;
        visit.updated_at = now;
        visit.updated_by = Some(editor);
    }
}

impl ClinicalRecord for Visit {
    const KIND: RecordKind = RecordKind::Visits;
    const METRICS: &'static [&'static str] = &["hemoglobin_level", "weight_kg"];
    const EXPORT_COLUMNS: &'static [&'static str] = &[
        "id",
        "patient",
        "provider",
        "pregnancy",
        "delivery",
        "visit_date",
        "visit_type",
        "blood_pressure",
        "heart_rate",
        "hemoglobin_level",
        "weight_kg",
        "height_cm",
        "uterine_height_cm",
        "fetal_heart_rate",
        "fetal_movement_count",
        "fetal_weight_estimate_g",
        "breastfeeding_status",
        "postpartum_complications",
        "newborn_health_issues",
        "follow_up_date",
        "notes",
        "complications",
        "interventions",
        "referrals",
        "created_at",
        "updated_at",
        "created_by",
        "updated_by",
    ];

    type Summary = VisitSummaryRes;

    fn rows(records: &Records) -> &[Self] {
        &records.visits
    }

    fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    fn pregnancy_link(&self) -> Option<PregnancyId> {
        self.pregnancy_id
    }

    fn delivery_link(&self) -> Option<DeliveryId> {
        self.delivery_id
    }

    fn category(&self) -> Option<&str> {
        Some(self.visit_type.as_str())
    }

    fn metric(&self, index: usize) -> Option<f64> {
        match index {
            0 => self.hemoglobin_level,
            1 => self.weight_kg,
            _ => None,
        }
    }

    fn period(&self) -> Option<NaiveDate> {
        Some(self.visit_date.date_naive())
    }

    fn export_row(&self) -> Vec<ExportValue> {
        vec![
            ExportValue::Ref(self.id.get()),
            ExportValue::Ref(self.patient_id.get()),
            ExportValue::Ref(self.provider_id.get()),
            ExportValue::optional_ref(self.pregnancy_id.map(PregnancyId::get)),
            ExportValue::optional_ref(self.delivery_id.map(DeliveryId::get)),
            ExportValue::DateTime(self.visit_date),
            ExportValue::text(self.visit_type.as_str()),
            ExportValue::text(self.blood_pressure.as_str()),
            ExportValue::Integer(i64::from(self.heart_rate)),
            ExportValue::optional_decimal(self.hemoglobin_level),
            ExportValue::optional_decimal(self.weight_kg),
            ExportValue::optional_decimal(self.height_cm),
            ExportValue::optional_decimal(self.uterine_height_cm),
            ExportValue::optional_integer(self.fetal_heart_rate.map(i64::from)),
            ExportValue::optional_integer(self.fetal_movement_count.map(i64::from)),
            ExportValue::optional_integer(self.fetal_weight_estimate_g.map(i64::from)),
            ExportValue::optional_bool(self.breastfeeding_status),
            ExportValue::optional_text(self.postpartum_complications.as_deref()),
            ExportValue::optional_text(self.newborn_health_issues.as_deref()),
            ExportValue::optional_date(self.follow_up_date),
            ExportValue::optional_text(self.notes.as_deref()),
            ExportValue::optional_text(self.complications.as_deref()),
            ExportValue::optional_text(self.interventions.as_deref()),
            ExportValue::optional_text(self.referrals.as_deref()),
            ExportValue::DateTime(self.created_at),
            ExportValue::DateTime(self.updated_at),
            ExportValue::optional_ref(self.created_by.map(UserId::get)),
            ExportValue::optional_ref(self.updated_by.map(UserId::get)),
        ]
    }

    fn summarise(report: AggregateReport) -> VisitSummaryRes {
        VisitSummaryRes {
            total_visits: report.total,
            average_hemoglobin_level: report.average("hemoglobin_level"),
            average_weight_kg: report.average("weight_kg"),
            monthly_visits: report.monthly_wire(),
            by_visit_type: report.grouped_counts,
        }
    }
}
