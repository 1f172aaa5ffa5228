//! Shared test records.

use crate::models::Actor;
use crate::store::Records;
use mhr_types::{DeliveryId, PatientId, PregnancyId};

pub(crate) const RECORDS_YAML: &str = r#"
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

pub(crate) fn records() -> Records {
    Records::parse(RECORDS_YAML).expect("fixture records should parse")
}

pub(crate) fn patient_a() -> PatientId {
    PatientId::new(10).unwrap()
}

pub(crate) fn patient_b() -> PatientId {
    PatientId::new(11).unwrap()
}

pub(crate) fn patient_c() -> PatientId {
    PatientId::new(12).unwrap()
}

pub(crate) fn pregnancy(raw: u64) -> PregnancyId {
    PregnancyId::new(raw).unwrap()
}

pub(crate) fn delivery(raw: u64) -> DeliveryId {
    DeliveryId::new(raw).unwrap()
}

pub(crate) fn actor(records: &Records, username: &str) -> Actor {
    let user = records
        .user_by_username(username)
        .expect("fixture user should exist");
    records.actor_for(user).expect("fixture actor should build")
}
