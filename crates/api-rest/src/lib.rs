//! # API REST
//!
//! REST API implementation for MHR.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Token authentication of every `/api` route except the health check
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON and CSV responses, CORS, request tracing)
//!
//! Business rules live in `mhr-core`; this crate only maps requests onto core services and
//! core errors onto status codes.

#![warn(rust_2018_idioms)]

pub mod analytics;
pub mod auth;
pub mod error;
pub mod records;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use api_shared::{
    DeliverySummaryRes, ErrorRes, HealthRes, HealthService, MonthlyCount, PatientRes,
    PregnancySummaryRes, VisitSummaryRes,
};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        analytics::summary,
        analytics::scoped_summary,
        analytics::export,
        analytics::scoped_export,
        records::list_patients,
        records::get_patient,
        records::create_patient,
        records::list_pregnancies,
        records::list_patient_pregnancies,
        records::create_pregnancy,
        records::list_deliveries,
        records::list_scoped_deliveries,
        records::create_delivery,
        records::list_visits,
        records::list_scoped_visits,
        records::create_visit,
        records::create_patient_visit,
        records::get_pregnancy,
        records::update_pregnancy,
        records::delete_pregnancy,
        records::get_delivery,
        records::update_delivery,
        records::delete_delivery,
        records::get_visit,
        records::update_visit,
        records::delete_visit,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        MonthlyCount,
        DeliverySummaryRes,
        PregnancySummaryRes,
        VisitSummaryRes,
        PatientRes,
    ))
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Does not require authentication and does not touch the record store.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

/// Builds the application router with every `/api` route, Swagger UI, CORS and tracing.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        // analytics
        .route("/analytics/:kind/summary", get(analytics::summary))
        .route("/analytics/:kind/export", get(analytics::export))
        .route(
            "/patients/:patient_pk/analytics/:kind/summary",
            get(analytics::scoped_summary),
        )
        .route(
            "/patients/:patient_pk/analytics/:kind/export",
            get(analytics::scoped_export),
        )
        .route(
            "/patients/:patient_pk/pregnancies/:pregnancy_pk/analytics/:kind/summary",
            get(analytics::scoped_summary),
        )
        .route(
            "/patients/:patient_pk/pregnancies/:pregnancy_pk/analytics/:kind/export",
            get(analytics::scoped_export),
        )
        .route(
            "/patients/:patient_pk/deliveries/:delivery_pk/analytics/:kind/summary",
            get(analytics::scoped_summary),
        )
        .route(
            "/patients/:patient_pk/deliveries/:delivery_pk/analytics/:kind/export",
            get(analytics::scoped_export),
        )
        .route(
            "/deliveries/:delivery_pk/analytics/:kind/summary",
            get(analytics::scoped_summary),
        )
        .route(
            "/deliveries/:delivery_pk/analytics/:kind/export",
            get(analytics::scoped_export),
        )
        // patients
        .route(
            "/patients",
            get(records::list_patients).post(records::create_patient),
        )
        .route("/patients/:patient_pk", get(records::get_patient))
        // pregnancies
        .route("/pregnancies", get(records::list_pregnancies))
        .route(
            "/pregnancies/:pregnancy_pk",
            get(records::get_pregnancy)
                .put(records::update_pregnancy)
                .delete(records::delete_pregnancy),
        )
        .route(
            "/patients/:patient_pk/pregnancies",
            get(records::list_patient_pregnancies).post(records::create_pregnancy),
        )
        // deliveries
        .route(
            "/deliveries",
            get(records::list_deliveries).post(records::create_delivery),
        )
        .route(
            "/deliveries/:delivery_pk",
            get(records::get_delivery)
                .put(records::update_delivery)
                .delete(records::delete_delivery),
        )
        .route(
            "/patients/:patient_pk/deliveries",
            get(records::list_scoped_deliveries),
        )
        .route(
            "/patients/:patient_pk/pregnancies/:pregnancy_pk/deliveries",
            get(records::list_scoped_deliveries),
        )
        // visits
        .route(
            "/visits",
            get(records::list_visits).post(records::create_visit),
        )
        .route(
            "/visits/:visit_pk",
            get(records::get_visit)
                .put(records::update_visit)
                .delete(records::delete_visit),
        )
        .route(
            "/patients/:patient_pk/visits",
            get(records::list_scoped_visits).post(records::create_patient_visit),
        )
        .route(
            "/patients/:patient_pk/pregnancies/:pregnancy_pk/visits",
            get(records::list_scoped_visits),
        )
        .route(
            "/patients/:patient_pk/deliveries/:delivery_pk/visits",
            get(records::list_scoped_visits),
        );

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the API until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    tracing::info!("-- Starting MHR REST API on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
