use crate::aggregate::AggregateReport;
use crate::kind::{ClinicalRecord, ExportValue, RecordKind};
use crate::store::Records;
use api_shared::wire::DeliverySummaryRes;
use chrono::{DateTime, NaiveDate, Utc};
use mhr_types::{DeliveryId, PatientId, PregnancyId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Vaginal,
    Cesarean,
    Assisted,
}

impl DeliveryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMode::Vaginal => "vaginal",
            DeliveryMode::Cesarean => "cesarean",
            DeliveryMode::Assisted => "assisted",
        }
    }
}

/// A delivery and its newborn outcome.
///
/// `patient_id` duplicates `pregnancy.patient_id` so deliveries can be scoped without a join.
/// The record store rejects any delivery where the two disagree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delivery {
    pub id: DeliveryId,
    pub pregnancy_id: PregnancyId,
    pub patient_id: PatientId,
    pub delivery_date: DateTime<Utc>,
    pub delivery_mode: DeliveryMode,
    pub birth_weight_g: u32,
    pub place_of_delivery: String,
    pub skilled_birth_attendant: bool,
    pub newborn_gender: String,
    pub apgar_score_1min: u8,
    pub apgar_score_5min: u8,
    #[serde(default = "alive_by_default")]
    pub alive: bool,
    pub congenital_anomalies: Option<String>,
    pub neonatal_complications: Option<String>,
    pub complications: Option<String>,
    pub interventions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
}

fn alive_by_default() -> bool {
    true
}

/// Request body for recording a delivery.
///
/// The owning patient is always taken from the pregnancy; a `patient_id` may be sent only to
/// assert which patient the caller expects.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDelivery {
    pub pregnancy_id: PregnancyId,
    pub patient_id: Option<PatientId>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub delivery_mode: DeliveryMode,
    pub birth_weight_g: u32,
    pub place_of_delivery: String,
    pub skilled_birth_attendant: bool,
    pub newborn_gender: String,
    pub apgar_score_1min: u8,
    pub apgar_score_5min: u8,
    #[serde(default = "alive_by_default")]
    pub alive: bool,
    pub congenital_anomalies: Option<String>,
    pub neonatal_complications: Option<String>,
    pub complications: Option<String>,
    pub interventions: Option<String>,
}

impl NewDelivery {
    pub fn into_delivery(
        self,
        id: DeliveryId,
        patient_id: PatientId,
        author: UserId,
        now: DateTime<Utc>,
    ) -> Delivery {
        Delivery {
            id,
            pregnancy_id: self.pregnancy_id,
            patient_id,
            delivery_date: self.delivery_date.unwrap_or(now),
            delivery_mode: self.delivery_mode,
            birth_weight_g: self.birth_weight_g,
            place_of_delivery: self.place_of_delivery,
            skilled_birth_attendant: self.skilled_birth_attendant,
            newborn_gender: self.newborn_gender,
            apgar_score_1min: self.apgar_score_1min,
            apgar_score_5min: self.apgar_score_5min,
            alive: self.alive,
            congenital_anomalies: self.congenital_anomalies,
            neonatal_complications: self.neonatal_complications,
            complications: self.complications,
            interventions: self.interventions,
            created_at: now,
            updated_at: now,
            created_by: Some(author),
            updated_by: Some(author),
        }
    }

    /// Replaces the outcome fields of `delivery`. The pregnancy and patient links are fixed
    /// once recorded; a body without `delivery_date` keeps the stored one.
    pub(crate) fn apply_to(self, delivery: &mut Delivery, editor: UserId, now: DateTime<Utc>) {
        if let Some(date) = self.delivery_date {
            delivery.delivery_date = date;
        }
        delivery.delivery_mode = self.delivery_mode;
        delivery.birth_weight_g = self.birth_weight_g;
        delivery.place_of_delivery = self.place_of_delivery;
        delivery.skilled_birth_attendant = self.skilled_birth_attendant;
        delivery.newborn_gender = self.newborn_gender;
        delivery.apgar_score_1min = self.apgar_score_1min;
        delivery.apgar_score_5min = self.apgar_score_5min;
        delivery.alive = self.alive;
        delivery.congenital_anomalies = self.congenital_anomalies;
        delivery.neonatal_complications = self.neonatal_complications;
        delivery.complications = self.complications;
        delivery.interventions = self.interventions;
        delivery.updated_at = now;
        delivery.updated_by = Some(editor);
    }
}

impl ClinicalRecord for Delivery {
    const KIND: RecordKind = RecordKind::Deliveries;
    const METRICS: &'static [&'static str] = &["birth_weight_g"];
    const EXPORT_COLUMNS: &'static [&'static str] = &[
        "id",
        "pregnancy",
        "patient",
        "delivery_date",
        "delivery_mode",
        "birth_weight_g",
        "place_of_delivery",
        "skilled_birth_attendant",
        "newborn_gender",
        "apgar_score_1min",
        "apgar_score_5min",
        "alive",
        "congenital_anomalies",
        "neonatal_complications",
        "complications",
        "interventions",
        "created_at",
        "updated_at",
        "created_by",
        "updated_by",
    ];

    type Summary = DeliverySummaryRes;

    fn rows(records: &Records) -> &[Self] {
        &records.deliveries
    }

    fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    fn pregnancy_link(&self) -> Option<PregnancyId> {
        Some(self.pregnancy_id)
    }

    fn delivery_link(&self) -> Option<DeliveryId> {
        Some(self.id)
    }

    fn category(&self) -> Option<&str> {
        Some(self.delivery_mode.as_str())
    }

    fn metric(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(f64::from(self.birth_weight_g)),
            _ => None,
        }
    }

    fn period(&self) -> Option<NaiveDate> {
        Some(self.delivery_date.date_naive())
    }

    fn export_row(&self) -> Vec<ExportValue> {
        vec![
            ExportValue::Ref(self.id.get()),
            ExportValue::Ref(self.pregnancy_id.get()),
            ExportValue::Ref(self.patient_id.get()),
            ExportValue::DateTime(self.delivery_date),
            ExportValue::text(self.delivery_mode.as_str()),
            ExportValue::Integer(i64::from(self.birth_weight_g)),
            ExportValue::text(self.place_of_delivery.as_str()),
            ExportValue::Bool(self.skilled_birth_attendant),
            ExportValue::text(self.newborn_gender.as_str()),
            ExportValue::Integer(i64::from(self.apgar_score_1min)),
            ExportValue::Integer(i64::from(self.apgar_score_5min)),
            ExportValue::Bool(self.alive),
            ExportValue::optional_text(self.congenital_anomalies.as_deref()),
            ExportValue::optional_text(self.neonatal_complications.as_deref()),
            ExportValue::optional_text(self.complications.as_deref()),
            ExportValue::optional_text(self.interventions.as_deref()),
            ExportValue::DateTime(self.created_at),
            ExportValue::DateTime(self.updated_at),
            ExportValue::optional_ref(self.created_by.map(UserId::get)),
            ExportValue::optional_ref(self.updated_by.map(UserId::get)),
        ]
    }

    fn summarise(report: AggregateReport) -> DeliverySummaryRes {
        DeliverySummaryRes {
            total_deliveries: report.total,
            average_birth_weight_g: report.average("birth_weight_g"),
            monthly_deliveries: report.monthly_wire(),
            by_mode: report.grouped_counts,
        }
    }
}
