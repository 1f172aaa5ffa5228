//! # MHR Core
//!
//! Core business logic for the maternal health records service.
//!
//! This crate owns the record store and everything computed from it:
//! - Scope resolution of `{patient, pregnancy, delivery}` path identifiers
//! - The role-based access policy for analytics and list views
//! - Summary statistics and CSV export for deliveries, pregnancies and visits
//! - List and create operations for patients and their clinical records
//!
//! **No API concerns**: authentication headers, HTTP routing and response formatting belong in
//! `api-rest`; wire types shared with clients live in `api-shared`.

pub mod access;
pub mod aggregate;
pub mod analytics;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod kind;
pub mod models;
pub mod records;
pub mod scope;
pub mod store;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use access::{authorize, AccessDecision};
pub use aggregate::{aggregate, AggregateReport, MonthBucket};
pub use analytics::AnalyticsService;
pub use config::{nesting_policy_from_env_value, CoreConfig};
pub use error::{RecordsError, RecordsResult};
pub use export::ExportTable;
pub use kind::{ClinicalRecord, ExportValue, RecordKind};
pub use records::{PregnancyOrdering, RecordService};
pub use scope::{NestingPolicy, ResolvedScope, Scope};
pub use store::{RecordStore, Records};
pub use validation::FieldErrors;
