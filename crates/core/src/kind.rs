//! Per-kind record descriptors.
//!
//! Deliveries, pregnancies and visits share one scope resolver, aggregation engine and export
//! formatter. Each kind describes itself through [`ClinicalRecord`]: how it links to its owning
//! patient, pregnancy and delivery, which field it is grouped by, which numeric fields are
//! averaged, which date drives the monthly series, and which columns it exports.

use crate::aggregate::AggregateReport;
use crate::store::Records;
use chrono::{DateTime, NaiveDate, Utc};
use mhr_types::{DeliveryId, PatientId, PregnancyId};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The record kinds that support summaries and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Deliveries,
    Pregnancies,
    Visits,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Deliveries,
        RecordKind::Pregnancies,
        RecordKind::Visits,
    ];

    /// Plural name, as used in routes and "No <kind> found" messages.
    pub fn plural(self) -> &'static str {
        match self {
            RecordKind::Deliveries => "deliveries",
            RecordKind::Pregnancies => "pregnancies",
            RecordKind::Visits => "visits",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            RecordKind::Deliveries => "delivery",
            RecordKind::Pregnancies => "pregnancy",
            RecordKind::Visits => "visit",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

impl FromStr for RecordKind {
    type Err = crate::RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.plural() == wanted || kind.singular() == wanted)
            .ok_or_else(|| crate::RecordsError::InvalidInput(format!("unknown record kind: {s}")))
    }
}

/// A single exported cell before text rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Raw identifier of a related record.
    Ref(u64),
}

impl ExportValue {
    /// Renders the cell: ISO-8601 for dates and datetimes, the raw id for relations, natural
    /// text for everything else and an empty string for null.
    pub fn render(&self) -> String {
        match self {
            ExportValue::Null => String::new(),
            ExportValue::Text(text) => text.clone(),
            ExportValue::Integer(n) => n.to_string(),
            ExportValue::Decimal(n) => n.to_string(),
            ExportValue::Bool(b) => b.to_string(),
            ExportValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            ExportValue::DateTime(dt) => dt.to_rfc3339(),
            ExportValue::Ref(id) => id.to_string(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        ExportValue::Text(value.into())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        value.map_or(ExportValue::Null, ExportValue::text)
    }

    pub fn optional_ref(value: Option<u64>) -> Self {
        value.map_or(ExportValue::Null, ExportValue::Ref)
    }

    pub fn optional_integer(value: Option<i64>) -> Self {
        value.map_or(ExportValue::Null, ExportValue::Integer)
    }

    pub fn optional_decimal(value: Option<f64>) -> Self {
        value.map_or(ExportValue::Null, ExportValue::Decimal)
    }

    pub fn optional_date(value: Option<NaiveDate>) -> Self {
        value.map_or(ExportValue::Null, ExportValue::Date)
    }

    pub fn optional_bool(value: Option<bool>) -> Self {
        value.map_or(ExportValue::Null, ExportValue::Bool)
    }
}

/// Descriptor implemented by every record kind that can be summarised and exported.
pub trait ClinicalRecord: Sized {
    const KIND: RecordKind;

    /// Names of the averaged numeric fields, indexed by [`ClinicalRecord::metric`].
    const METRICS: &'static [&'static str];

    /// Export column names, in the order produced by [`ClinicalRecord::export_row`].
    const EXPORT_COLUMNS: &'static [&'static str];

    /// Wire body returned by the summary endpoint.
    type Summary: Serialize;

    fn rows(records: &Records) -> &[Self];

    fn patient_id(&self) -> PatientId;

    /// The pregnancy this record belongs to (a pregnancy links to itself).
    fn pregnancy_link(&self) -> Option<PregnancyId>;

    /// The delivery this record belongs to (a delivery links to itself).
    fn delivery_link(&self) -> Option<DeliveryId>;

    /// Value of the grouped categorical field.
    fn category(&self) -> Option<&str>;

    fn metric(&self, index: usize) -> Option<f64>;

    /// Date driving the monthly series.
    fn period(&self) -> Option<NaiveDate>;

    fn export_row(&self) -> Vec<ExportValue>;

    fn summarise(report: AggregateReport) -> Self::Summary;
}
