use super::User;
use api_shared::wire::PatientRes;
use chrono::{Datelike, NaiveDate};
use mhr_types::{PatientId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Patient {
    pub id: PatientId,
    /// The account that owns this profile.
    pub user_id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub medical_record_number: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub marital_status: String,
    pub national_id: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub educational_level: String,
    #[serde(default)]
    pub occupation: String,
    /// Total number of pregnancies.
    #[serde(default)]
    pub gravidity: u16,
    /// Pregnancies reaching viable gestational age.
    #[serde(default)]
    pub parity: u16,
    #[serde(default)]
    pub communication_language: String,
}

impl Patient {
    /// Age in whole years on `today`, if the date of birth is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    pub fn to_wire(&self, user: &User, today: NaiveDate) -> PatientRes {
        PatientRes {
            id: self.id.get(),
            username: user.username.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            medical_record_number: self.medical_record_number.clone(),
            date_of_birth: self.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            age: self.age_on(today),
            address: self.address.clone(),
            marital_status: self.marital_status.clone(),
            national_id: self.national_id.clone(),
            phone_number: self.phone_number.clone(),
            educational_level: self.educational_level.clone(),
            occupation: self.occupation.clone(),
            gravidity: self.gravidity,
            parity: self.parity,
            communication_language: self.communication_language.clone(),
        }
    }
}

/// Request body for creating a patient profile.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPatient {
    pub user_id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub medical_record_number: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub marital_status: String,
    pub national_id: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub educational_level: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub gravidity: u16,
    #[serde(default)]
    pub parity: u16,
    #[serde(default)]
    pub communication_language: String,
}

impl NewPatient {
    pub fn into_patient(self, id: PatientId) -> Patient {
        Patient {
            id,
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            medical_record_number: self.medical_record_number,
            date_of_birth: self.date_of_birth,
            address: self.address,
            marital_status: self.marital_status,
            national_id: self.national_id,
            phone_number: self.phone_number,
            educational_level: self.educational_level,
            occupation: self.occupation,
            gravidity: self.gravidity,
            parity: self.parity,
            communication_language: self.communication_language,
        }
    }
}
