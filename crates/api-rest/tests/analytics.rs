mod common;

use axum::http::{header, StatusCode};
use common::{app, app_with_policy, body_json, body_text, get, get_json, send};
use mhr_core::NestingPolicy;
use serde_json::json;

#[tokio::test]
async fn health_needs_no_token() {
    let response = send(app(), "GET", "/api/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let response = send(app(), "GET", "/api/analytics/deliveries/summary", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(
        body["detail"],
        json!("Authentication credentials were not provided.")
    );
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let response = get(app(), "/api/analytics/deliveries/summary", "tok-nobody").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unrecognised_role_is_forbidden() {
    let response = get(app(), "/api/analytics/visits/summary", "tok-receptionist").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_global_delivery_summary() {
    let (status, body) = get_json(app(), "/api/analytics/deliveries/summary", "tok-admin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_deliveries"], json!(3));
    assert_eq!(body["by_mode"], json!({"vaginal": 2, "cesarean": 1}));
    assert_eq!(body["average_birth_weight_g"], json!(3500.0));
    assert_eq!(
        body["monthly_deliveries"],
        json!([
            {"month": "2023-01-01", "count": 1},
            {"month": "2023-08-01", "count": 1},
            {"month": "2024-06-01", "count": 1}
        ])
    );
}

#[tokio::test]
async fn admin_patient_scoped_delivery_summary() {
    let (status, body) = get_json(
        app(),
        "/api/patients/10/analytics/deliveries/summary",
        "tok-admin",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_deliveries"], json!(2));
    assert_eq!(body["by_mode"], json!({"vaginal": 2}));
}

#[tokio::test]
async fn patient_global_summary_is_narrowed_to_own_records() {
    let (status, body) = get_json(app(), "/api/analytics/pregnancies/summary", "tok-b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_pregnancies"], json!(2));
    assert_eq!(body["by_blood_type"], json!({"B+": 1, "unspecified": 1}));
    let series = body["monthly_pregnancies"].as_array().expect("series array");
    assert_eq!(series.last(), Some(&json!({"month": null, "count": 1})));
}

#[tokio::test]
async fn patient_summary_for_other_patient_is_forbidden() {
    let response = get(app(), "/api/patients/11/analytics/deliveries/summary", "tok-a").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Same answer for a patient id that does not exist.
    let response = get(app(), "/api/patients/999/analytics/deliveries/summary", "tok-a").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patient_without_profile_gets_404() {
    let response = get(app(), "/api/analytics/visits/summary", "tok-orphan").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mismatched_pregnancy_yields_empty_summary() {
    let (status, body) = get_json(
        app(),
        "/api/patients/11/pregnancies/5/analytics/visits/summary",
        "tok-doctor",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_visits"], json!(0));
    assert_eq!(body["by_visit_type"], json!({}));
    assert_eq!(body["average_hemoglobin_level"], json!(null));
    assert_eq!(body["monthly_visits"], json!([]));
}

#[tokio::test]
async fn nested_visit_summary_counts_linked_visits() {
    let (status, body) = get_json(
        app(),
        "/api/patients/10/pregnancies/5/analytics/visits/summary",
        "tok-nurse",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_visits"], json!(2));
    assert_eq!(body["by_visit_type"], json!({"Antenatal": 1, "Postnatal": 1}));
    assert_eq!(body["average_hemoglobin_level"], json!(11.5));
}

#[tokio::test]
async fn delivery_scoped_visits_without_patient() {
    let (status, body) =
        get_json(app(), "/api/deliveries/3/analytics/visits/summary", "tok-doctor").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_visits"], json!(1));
}

#[tokio::test]
async fn full_chain_policy_rejects_unknown_delivery() {
    let (status, body) = get_json(
        app_with_policy(NestingPolicy::FullChain),
        "/api/deliveries/42/analytics/visits/summary",
        "tok-doctor",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_visits"], json!(0));
}

#[tokio::test]
async fn unsupported_kind_under_nesting_is_not_found() {
    let response = get(
        app(),
        "/api/patients/10/pregnancies/5/analytics/pregnancies/summary",
        "tok-doctor",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app(), "/api/analytics/babies/summary", "tok-doctor").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let response = get(app(), "/api/patients/abc/analytics/visits/summary", "tok-doctor").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app(), "/api/patients/0/analytics/visits/summary", "tok-doctor").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let response = get(app(), "/api/patients/11/analytics/deliveries/export", "tok-doctor").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/csv"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap(),
        "attachment; filename=\"deliveries.csv\""
    );

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2, "header plus one delivery: {csv}");
    assert!(lines[0].starts_with("id,pregnancy,patient,delivery_date"));
    assert!(lines[1].starts_with("3,7,11,2023-08-10T00:00:00+00:00,cesarean,3800,"));
    assert!(lines[1].contains("\"Hospital B, East Wing\""));
}

#[tokio::test]
async fn empty_export_is_404_with_detail() {
    let (status, body) = get_json(app(), "/api/analytics/visits/export", "tok-c").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "No visits found"}));
}

#[tokio::test]
async fn patient_export_of_other_patient_is_forbidden() {
    let response = get(app(), "/api/patients/10/analytics/visits/export", "tok-b").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
