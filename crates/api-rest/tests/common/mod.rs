//! Shared router fixture for the HTTP tests.

#![allow(dead_code)]

use api_rest::{router, AppState};
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mhr_core::{NestingPolicy, RecordStore, Records};
use std::sync::Arc;
use tower::ServiceExt;

pub const RECORDS_YAML: &str = r#"
users:
  - { id: 1, username: patient_a, role: patient, first_name: Jane, last_name: Doe, token: tok-a }
  - { id: 2, username: patient_b, role: patient, first_name: Mary, last_name: Smith, token: tok-b }
  - { id: 3, username: doctor, role: doctor, token: tok-doctor }
  - { id: 4, username: nurse, role: nurse, token: tok-nurse }
  - { id: 5, username: admin, role: admin, token: tok-admin }
  - { id: 6, username: receptionist, role: receptionist, token: tok-receptionist }
  - { id: 7, username: orphan, role: patient, token: tok-orphan }
  - { id: 8, username: patient_c, role: patient, token: tok-c }
patients:
  - id: 10
    user_id: 1
    first_name: Jane
    last_name: Doe
    medical_record_number: MRN-A
    date_of_birth: 1990-05-15
    national_id: NID-A
    gravidity: 2
    parity: 2
  - id: 11
    user_id: 2
    first_name: Mary
    last_name: Smith
    medical_record_number: MRN-B
    date_of_birth: 1992-03-20
    national_id: NID-B
    gravidity: 2
    parity: 1
  - id: 12
    user_id: 8
    first_name: Ada
    last_name: Okafor
    medical_record_number: MRN-C
    national_id: NID-C
pregnancies:
  - { id: 5, patient_id: 10, gestational_age_weeks: 12, last_menstrual_period: 2022-10-15, expected_delivery_date: 2023-07-22, blood_type: O+ }
  - { id: 6, patient_id: 10, gestational_age_weeks: 20, last_menstrual_period: 2024-01-20, expected_delivery_date: 2024-10-27, blood_type: A- }
  - { id: 7, patient_id: 11, gestational_age_weeks: 16, last_menstrual_period: 2023-03-10, expected_delivery_date: 2023-12-17, blood_type: B+ }
  - { id: 8, patient_id: 11, gestational_age_weeks: 8 }
deliveries:
  - id: 1
    pregnancy_id: 5
    patient_id: 10
    delivery_date: 2023-01-15T00:00:00Z
    delivery_mode: vaginal
    birth_weight_g: 3500
    place_of_delivery: Hospital A
    skilled_birth_attendant: true
    newborn_gender: Female
    apgar_score_1min: 8
    apgar_score_5min: 9
    created_at: 2023-01-15T00:00:00Z
    updated_at: 2023-01-15T00:00:00Z
  - id: 2
    pregnancy_id: 6
    patient_id: 10
    delivery_date: 2024-06-20T00:00:00Z
    delivery_mode: vaginal
    birth_weight_g: 3200
    place_of_delivery: Hospital A
    skilled_birth_attendant: true
    newborn_gender: Male
    apgar_score_1min: 7
    apgar_score_5min: 8
    created_at: 2024-06-20T00:00:00Z
    updated_at: 2024-06-20T00:00:00Z
  - id: 3
    pregnancy_id: 7
    patient_id: 11
    delivery_date: 2023-08-10T00:00:00Z
    delivery_mode: cesarean
    birth_weight_g: 3800
    place_of_delivery: "Hospital B, East Wing"
    skilled_birth_attendant: true
    newborn_gender: Male
    apgar_score_1min: 9
    apgar_score_5min: 10
    complications: none
    created_at: 2023-08-10T00:00:00Z
    updated_at: 2023-08-10T00:00:00Z
visits:
  - { id: 1, patient_id: 10, provider_id: 3, pregnancy_id: 5, visit_date: 2023-01-03T09:00:00Z, visit_type: Antenatal, blood_pressure: 110/70, heart_rate: 80, hemoglobin_level: 11.0, weight_kg: 60.0, created_at: 2023-01-03T09:00:00Z, updated_at: 2023-01-03T09:00:00Z }
  - { id: 2, patient_id: 10, provider_id: 3, pregnancy_id: 5, delivery_id: 1, visit_date: 2023-01-28T09:00:00Z, visit_type: PNC, blood_pressure: 115/75, heart_rate: 78, hemoglobin_level: 12.0, created_at: 2023-01-28T09:00:00Z, updated_at: 2023-01-28T09:00:00Z }
  - { id: 3, patient_id: 10, provider_id: 4, visit_date: 2023-03-05T09:00:00Z, visit_type: General, blood_pressure: 120/80, heart_rate: 72, weight_kg: 62.0, created_at: 2023-03-05T09:00:00Z, updated_at: 2023-03-05T09:00:00Z }
  - { id: 4, patient_id: 11, provider_id: 3, pregnancy_id: 7, visit_date: 2023-01-20T09:00:00Z, visit_type: ANC, blood_pressure: 118/76, heart_rate: 84, hemoglobin_level: 10.0, weight_kg: 70.0, created_at: 2023-01-20T09:00:00Z, updated_at: 2023-01-20T09:00:00Z }
  - { id: 5, patient_id: 11, provider_id: 3, pregnancy_id: 7, delivery_id: 3, visit_date: 2023-08-25T09:00:00Z, visit_type: Postnatal, blood_pressure: 112/72, heart_rate: 76, created_at: 2023-08-25T09:00:00Z, updated_at: 2023-08-25T09:00:00Z }
"#;

pub fn app() -> Router {
    app_with_policy(NestingPolicy::default())
}

pub fn app_with_policy(policy: NestingPolicy) -> Router {
    let records = Records::parse(RECORDS_YAML).expect("fixture records should parse");
    let store = RecordStore::in_memory(records).expect("fixture store should build");
    router(AppState::new(Arc::new(store), policy))
}

pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).expect("body should be JSON")
}

pub async fn get_json(app: Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    let response = get(app, uri, token).await;
    let status = response.status();
    (status, body_json(response).await)
}
