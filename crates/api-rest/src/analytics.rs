//! Analytics endpoints: per-kind summaries and CSV exports.
//!
//! One pair of handlers serves every nesting level. The record kind and any scope identifiers
//! come from the path; a kind that cannot appear under the given nesting (pregnancies under a
//! pregnancy or a delivery, deliveries under a delivery) is answered with 404 like any other
//! unknown route.

use crate::auth::AuthenticatedActor;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use mhr_core::models::{Delivery, Pregnancy, Visit};
use mhr_core::{RecordKind, Scope};
use mhr_types::{DeliveryId, PatientId, PregnancyId};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct AnalyticsPath {
    /// `deliveries`, `pregnancies` or `visits`
    kind: String,
    #[param(value_type = Option<u64>)]
    patient_pk: Option<PatientId>,
    #[param(value_type = Option<u64>)]
    pregnancy_pk: Option<PregnancyId>,
    #[param(value_type = Option<u64>)]
    delivery_pk: Option<DeliveryId>,
}

impl AnalyticsPath {
    fn into_request(self) -> Result<(RecordKind, Scope), ApiError> {
        let kind: RecordKind = self.kind.parse().map_err(|_| ApiError::NotFound)?;
        let nested_ok = match kind {
            RecordKind::Visits => true,
            RecordKind::Deliveries => self.delivery_pk.is_none(),
            RecordKind::Pregnancies => self.pregnancy_pk.is_none() && self.delivery_pk.is_none(),
        };
        if !nested_ok || self.kind != kind.plural() {
            return Err(ApiError::NotFound);
        }
        Ok((
            kind,
            Scope {
                patient: self.patient_pk,
                pregnancy: self.pregnancy_pk,
                delivery: self.delivery_pk,
            },
        ))
    }
}

#[utoipa::path(
    get,
    path = "/api/analytics/{kind}/summary",
    params(("kind" = String, Path, description = "deliveries, pregnancies or visits")),
    responses(
        (status = 200, description = "Summary of the records visible to the caller",
            body = api_shared::DeliverySummaryRes),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes),
        (status = 403, description = "Role may not read analytics", body = api_shared::ErrorRes),
        (status = 404, description = "Caller has no patient profile", body = api_shared::ErrorRes)
    )
)]
/// Summary over every record of a kind visible to the caller
///
/// Patients are narrowed to their own record; clinical staff see all patients.
#[axum::debug_handler(state = AppState)]
pub async fn summary(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(path): Path<AnalyticsPath>,
) -> Result<Response, ApiError> {
    let (kind, scope) = path.into_request()?;
    let analytics = &state.analytics;
    let response = match kind {
        RecordKind::Deliveries => {
            Json(analytics.summary::<Delivery>(&actor, scope)?).into_response()
        }
        RecordKind::Pregnancies => {
            Json(analytics.summary::<Pregnancy>(&actor, scope)?).into_response()
        }
        RecordKind::Visits => Json(analytics.summary::<Visit>(&actor, scope)?).into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_pk}/analytics/{kind}/summary",
    params(AnalyticsPath),
    responses(
        (status = 200, description = "Summary within the requested scope",
            body = api_shared::VisitSummaryRes),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes),
        (status = 403, description = "Patient asked for another patient", body = api_shared::ErrorRes),
        (status = 404, description = "Caller has no patient profile", body = api_shared::ErrorRes)
    )
)]
/// Summary within a patient, pregnancy or delivery scope
///
/// Also serves the pregnancy- and delivery-nested forms of the route. Identifiers that do not
/// belong together yield an empty summary rather than an error.
#[axum::debug_handler(state = AppState)]
pub async fn scoped_summary(
    state: State<AppState>,
    actor: AuthenticatedActor,
    path: Path<AnalyticsPath>,
) -> Result<Response, ApiError> {
    summary(state, actor, path).await
}

#[utoipa::path(
    get,
    path = "/api/analytics/{kind}/export",
    params(("kind" = String, Path, description = "deliveries, pregnancies or visits")),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes),
        (status = 403, description = "Role may not read analytics", body = api_shared::ErrorRes),
        (status = 404, description = "No records to export", body = api_shared::ErrorRes)
    )
)]
/// CSV export of every record of a kind visible to the caller
#[axum::debug_handler(state = AppState)]
pub async fn export(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(path): Path<AnalyticsPath>,
) -> Result<Response, ApiError> {
    let (kind, scope) = path.into_request()?;
    let analytics = &state.analytics;
    let table = match kind {
        RecordKind::Deliveries => analytics.export::<Delivery>(&actor, scope)?,
        RecordKind::Pregnancies => analytics.export::<Pregnancy>(&actor, scope)?,
        RecordKind::Visits => analytics.export::<Visit>(&actor, scope)?,
    };

    tracing::info!(
        kind = %kind,
        rows = table.rows.len(),
        user_id = %actor.user_id,
        "exported records"
    );

    let disposition = format!("attachment; filename=\"{}.csv\"", kind.plural());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        table.to_csv(),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_pk}/analytics/{kind}/export",
    params(AnalyticsPath),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes),
        (status = 403, description = "Patient asked for another patient", body = api_shared::ErrorRes),
        (status = 404, description = "No records to export", body = api_shared::ErrorRes)
    )
)]
/// CSV export within a patient, pregnancy or delivery scope
#[axum::debug_handler(state = AppState)]
pub async fn scoped_export(
    state: State<AppState>,
    actor: AuthenticatedActor,
    path: Path<AnalyticsPath>,
) -> Result<Response, ApiError> {
    export(state, actor, path).await
}
