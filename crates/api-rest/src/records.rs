//! Patient, pregnancy, delivery and visit endpoints.
//!
//! Lists are ownership-filtered for patients. Nested routes narrow the list to the records
//! linked to the identifiers in the path. Single pregnancies, deliveries and visits can be read,
//! replaced and deleted by staff.

use crate::auth::AuthenticatedActor;
use crate::error::ApiError;
use crate::state::AppState;
use api_shared::PatientRes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mhr_core::models::{
    Delivery, NewDelivery, NewPatient, NewPregnancy, NewVisit, Pregnancy, Visit,
};
use mhr_core::{PregnancyOrdering, Scope};
use mhr_types::{DeliveryId, PatientId, PregnancyId, VisitId};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ScopePath {
    #[param(value_type = Option<u64>)]
    patient_pk: Option<PatientId>,
    #[param(value_type = Option<u64>)]
    pregnancy_pk: Option<PregnancyId>,
    #[param(value_type = Option<u64>)]
    delivery_pk: Option<DeliveryId>,
}

impl From<ScopePath> for Scope {
    fn from(path: ScopePath) -> Self {
        Scope {
            patient: path.patient_pk,
            pregnancy: path.pregnancy_pk,
            delivery: path.delivery_pk,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PatientPath {
    patient_pk: PatientId,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive match on patient name or blood type
    search: Option<String>,
    /// `expected_delivery_date` (default) or `last_menstrual_period`, `-` prefix for descending
    ordering: Option<String>,
}

impl SearchQuery {
    fn ordering(&self) -> PregnancyOrdering {
        PregnancyOrdering::from_query(self.ordering.as_deref())
    }
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "Patients visible to the caller", body = [PatientRes]),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes)
    )
)]
/// List patient profiles
///
/// Patients see only their own profile.
#[axum::debug_handler(state = AppState)]
pub async fn list_patients(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<Json<Vec<PatientRes>>, ApiError> {
    Ok(Json(state.records.list_patients(&actor)?))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient profile", body = PatientRes),
        (status = 404, description = "Unknown or not visible", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_patient(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<PatientId>,
) -> Result<Json<PatientRes>, ApiError> {
    Ok(Json(state.records.get_patient(&actor, id)?))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    responses(
        (status = 201, description = "Patient profile created", body = PatientRes),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Patients may not create profiles", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_patient(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(new): Json<NewPatient>,
) -> Result<(StatusCode, Json<PatientRes>), ApiError> {
    let created = state.records.create_patient(&actor, new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/pregnancies",
    params(SearchQuery),
    responses(
        (status = 200, description = "Pregnancies ordered by expected delivery date"),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_pregnancies(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Pregnancy>>, ApiError> {
    let rows = state
        .records
        .list_pregnancies(&actor, None, query.search.as_deref(), query.ordering())?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_pk}/pregnancies",
    params(("patient_pk" = u64, Path, description = "Patient id"), SearchQuery),
    responses(
        (status = 200, description = "The patient's pregnancies"),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_patient_pregnancies(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(path): Path<PatientPath>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Pregnancy>>, ApiError> {
    let rows = state.records.list_pregnancies(
        &actor,
        Some(path.patient_pk),
        query.search.as_deref(),
        query.ordering(),
    )?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/patients/{patient_pk}/pregnancies",
    params(("patient_pk" = u64, Path, description = "Patient id")),
    responses(
        (status = 201, description = "Pregnancy recorded"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Patients may not record pregnancies", body = api_shared::ErrorRes),
        (status = 404, description = "Unknown patient", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_pregnancy(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(path): Path<PatientPath>,
    Json(new): Json<NewPregnancy>,
) -> Result<(StatusCode, Json<Pregnancy>), ApiError> {
    let created = state
        .records
        .create_pregnancy(&actor, path.patient_pk, new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/deliveries",
    responses(
        (status = 200, description = "Deliveries visible to the caller"),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_deliveries(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<Json<Vec<Delivery>>, ApiError> {
    Ok(Json(state.records.list_deliveries(&actor, Scope::global())?))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_pk}/deliveries",
    params(ScopePath),
    responses(
        (status = 200, description = "Deliveries within the scope"),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes)
    )
)]
/// Deliveries of a patient, optionally of one pregnancy
#[axum::debug_handler(state = AppState)]
pub async fn list_scoped_deliveries(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(path): Path<ScopePath>,
) -> Result<Json<Vec<Delivery>>, ApiError> {
    Ok(Json(state.records.list_deliveries(&actor, path.into())?))
}

#[utoipa::path(
    post,
    path = "/api/deliveries",
    responses(
        (status = 201, description = "Delivery recorded"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Patients may not record deliveries", body = api_shared::ErrorRes)
    )
)]
/// Record a delivery
///
/// The owning patient is taken from the pregnancy.
#[axum::debug_handler(state = AppState)]
pub async fn create_delivery(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(new): Json<NewDelivery>,
) -> Result<(StatusCode, Json<Delivery>), ApiError> {
    let created = state.records.create_delivery(&actor, None, new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/visits",
    responses(
        (status = 200, description = "Visits visible to the caller"),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn list_visits(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
) -> Result<Json<Vec<Visit>>, ApiError> {
    Ok(Json(state.records.list_visits(&actor, Scope::global())?))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_pk}/visits",
    params(ScopePath),
    responses(
        (status = 200, description = "Visits within the scope"),
        (status = 401, description = "Missing or invalid token", body = api_shared::ErrorRes)
    )
)]
/// Visits of a patient, optionally of one pregnancy or delivery
#[axum::debug_handler(state = AppState)]
pub async fn list_scoped_visits(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(path): Path<ScopePath>,
) -> Result<Json<Vec<Visit>>, ApiError> {
    Ok(Json(state.records.list_visits(&actor, path.into())?))
}

#[utoipa::path(
    post,
    path = "/api/visits",
    responses(
        (status = 201, description = "Visit recorded"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Visits are read-only for patients", body = api_shared::ErrorRes)
    )
)]
/// Record a visit; the patient must be given in the body
#[axum::debug_handler(state = AppState)]
pub async fn create_visit(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(new): Json<NewVisit>,
) -> Result<(StatusCode, Json<Visit>), ApiError> {
    let created = state.records.create_visit(&actor, Scope::global(), new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/patients/{patient_pk}/visits",
    params(("patient_pk" = u64, Path, description = "Patient id")),
    responses(
        (status = 201, description = "Visit recorded"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Visits are read-only for patients", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn create_patient_visit(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(path): Path<PatientPath>,
    Json(new): Json<NewVisit>,
) -> Result<(StatusCode, Json<Visit>), ApiError> {
    let scope = Scope::patient(path.patient_pk);
    let created = state.records.create_visit(&actor, scope, new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/pregnancies/{pregnancy_pk}",
    params(("pregnancy_pk" = u64, Path, description = "Pregnancy id")),
    responses(
        (status = 200, description = "The pregnancy"),
        (status = 404, description = "Unknown or not visible", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_pregnancy(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<PregnancyId>,
) -> Result<Json<Pregnancy>, ApiError> {
    Ok(Json(state.records.get_pregnancy(&actor, id)?))
}

#[utoipa::path(
    put,
    path = "/api/pregnancies/{pregnancy_pk}",
    params(("pregnancy_pk" = u64, Path, description = "Pregnancy id")),
    responses(
        (status = 200, description = "Pregnancy updated"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Patients may not change pregnancies", body = api_shared::ErrorRes),
        (status = 404, description = "Unknown pregnancy", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_pregnancy(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<PregnancyId>,
    Json(new): Json<NewPregnancy>,
) -> Result<Json<Pregnancy>, ApiError> {
    Ok(Json(state.records.update_pregnancy(&actor, id, new)?))
}

#[utoipa::path(
    delete,
    path = "/api/pregnancies/{pregnancy_pk}",
    params(("pregnancy_pk" = u64, Path, description = "Pregnancy id")),
    responses(
        (status = 204, description = "Pregnancy deleted"),
        (status = 403, description = "Patients may not change pregnancies", body = api_shared::ErrorRes),
        (status = 404, description = "Unknown pregnancy", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_pregnancy(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<PregnancyId>,
) -> Result<StatusCode, ApiError> {
    state.records.delete_pregnancy(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/deliveries/{delivery_pk}",
    params(("delivery_pk" = u64, Path, description = "Delivery id")),
    responses(
        (status = 200, description = "The delivery"),
        (status = 404, description = "Unknown or not visible", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_delivery(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<DeliveryId>,
) -> Result<Json<Delivery>, ApiError> {
    Ok(Json(state.records.get_delivery(&actor, id)?))
}

#[utoipa::path(
    put,
    path = "/api/deliveries/{delivery_pk}",
    params(("delivery_pk" = u64, Path, description = "Delivery id")),
    responses(
        (status = 200, description = "Delivery updated"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Patients may not change deliveries", body = api_shared::ErrorRes),
        (status = 404, description = "Unknown delivery", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_delivery(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<DeliveryId>,
    Json(new): Json<NewDelivery>,
) -> Result<Json<Delivery>, ApiError> {
    Ok(Json(state.records.update_delivery(&actor, id, new)?))
}

#[utoipa::path(
    delete,
    path = "/api/deliveries/{delivery_pk}",
    params(("delivery_pk" = u64, Path, description = "Delivery id")),
    responses(
        (status = 204, description = "Delivery deleted"),
        (status = 403, description = "Patients may not change deliveries", body = api_shared::ErrorRes),
        (status = 404, description = "Unknown delivery", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_delivery(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<DeliveryId>,
) -> Result<StatusCode, ApiError> {
    state.records.delete_delivery(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/visits/{visit_pk}",
    params(("visit_pk" = u64, Path, description = "Visit id")),
    responses(
        (status = 200, description = "The visit"),
        (status = 404, description = "Unknown or not visible", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn get_visit(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<VisitId>,
) -> Result<Json<Visit>, ApiError> {
    Ok(Json(state.records.get_visit(&actor, id)?))
}

#[utoipa::path(
    put,
    path = "/api/visits/{visit_pk}",
    params(("visit_pk" = u64, Path, description = "Visit id")),
    responses(
        (status = 200, description = "Visit updated"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Visits are read-only for patients", body = api_shared::ErrorRes),
        (status = 404, description = "Unknown visit", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn update_visit(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<VisitId>,
    Json(new): Json<NewVisit>,
) -> Result<Json<Visit>, ApiError> {
    Ok(Json(state.records.update_visit(&actor, id, new)?))
}

#[utoipa::path(
    delete,
    path = "/api/visits/{visit_pk}",
    params(("visit_pk" = u64, Path, description = "Visit id")),
    responses(
        (status = 204, description = "Visit deleted"),
        (status = 403, description = "Visits are read-only for patients", body = api_shared::ErrorRes),
        (status = 404, description = "Unknown visit", body = api_shared::ErrorRes)
    )
)]
#[axum::debug_handler(state = AppState)]
pub async fn delete_visit(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<VisitId>,
) -> Result<StatusCode, ApiError> {
    state.records.delete_visit(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}
