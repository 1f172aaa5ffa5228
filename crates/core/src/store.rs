//! Record store.
//!
//! Holds users, patients, pregnancies, deliveries and visits as one in-memory snapshot, backed
//! by a YAML file when opened from disk:
//!
//! ```text
//! <data_dir>/
//!   records.yaml    # users, patients, pregnancies, deliveries, visits
//! ```
//!
//! Cross-record invariants (denormalised owning-patient pointers, unique identifiers, linked
//! records existing) are enforced here, at load time and on every write. The aggregation and
//! export code only ever reads.
//!
//! Readers share a `RwLock` read guard, so every summary or export is computed against one
//! consistent snapshot. Writers apply their change to a copy, validate it, persist it and only
//! then swap it in.

use crate::models::{Actor, Delivery, Patient, Pregnancy, Role, User, Visit};
use crate::{RecordsError, RecordsResult};
use mhr_types::{DeliveryId, PatientId, PregnancyId, UserId, VisitId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A complete snapshot of every table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Records {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub pregnancies: Vec<Pregnancy>,
    #[serde(default)]
    pub deliveries: Vec<Delivery>,
    #[serde(default)]
    pub visits: Vec<Visit>,
}

impl Records {
    /// Parse a YAML snapshot and check its invariants.
    ///
    /// # Errors
    ///
    /// - `YamlDeserialization` naming the offending path if the YAML does not match the schema
    /// - `Integrity` if the records are inconsistent with each other
    pub fn parse(yaml_text: &str) -> RecordsResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let records = match serde_path_to_error::deserialize::<_, Records>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(RecordsError::YamlDeserialization(format!(
                    "schema mismatch at {path}: {source}"
                )));
            }
        };

        records.validate()?;
        Ok(records)
    }

    pub fn render(&self) -> RecordsResult<String> {
        serde_yaml::to_string(self).map_err(RecordsError::YamlSerialization)
    }

    /// Check every cross-record invariant.
    pub fn validate(&self) -> RecordsResult<()> {
        ensure_unique("user id", self.users.iter().map(|u| u.id))?;
        ensure_unique("username", self.users.iter().map(|u| u.username.as_str()))?;
        ensure_unique(
            "user token",
            self.users.iter().filter_map(|u| u.token.as_deref()),
        )?;
        ensure_unique("patient id", self.patients.iter().map(|p| p.id))?;
        ensure_unique("patient user", self.patients.iter().map(|p| p.user_id))?;
        ensure_unique(
            "medical record number",
            self.patients.iter().map(|p| p.medical_record_number.as_str()),
        )?;
        ensure_unique(
            "national id",
            self.patients.iter().map(|p| p.national_id.as_str()),
        )?;
        ensure_unique("pregnancy id", self.pregnancies.iter().map(|p| p.id))?;
        ensure_unique("delivery id", self.deliveries.iter().map(|d| d.id))?;
        ensure_unique("visit id", self.visits.iter().map(|v| v.id))?;

        let users: HashMap<UserId, &User> = self.users.iter().map(|u| (u.id, u)).collect();
        let patients: HashSet<PatientId> = self.patients.iter().map(|p| p.id).collect();
        let pregnancies: HashMap<PregnancyId, &Pregnancy> =
            self.pregnancies.iter().map(|p| (p.id, p)).collect();
        let deliveries: HashMap<DeliveryId, &Delivery> =
            self.deliveries.iter().map(|d| (d.id, d)).collect();

        for patient in &self.patients {
            let user = users.get(&patient.user_id).ok_or_else(|| {
                integrity(format!(
                    "patient {} references missing user {}",
                    patient.id, patient.user_id
                ))
            })?;
            if !matches!(user.role(), Ok(Role::Patient)) {
                return Err(integrity(format!(
                    "patient {} is linked to user {} whose role is {}",
                    patient.id, user.id, user.role
                )));
            }
            if patient.parity > patient.gravidity {
                return Err(integrity(format!(
                    "patient {} has parity greater than gravidity",
                    patient.id
                )));
            }
        }

        for pregnancy in &self.pregnancies {
            if !patients.contains(&pregnancy.patient_id) {
                return Err(integrity(format!(
                    "pregnancy {} references missing patient {}",
                    pregnancy.id, pregnancy.patient_id
                )));
            }
        }

        for delivery in &self.deliveries {
            let pregnancy = pregnancies.get(&delivery.pregnancy_id).ok_or_else(|| {
                integrity(format!(
                    "delivery {} references missing pregnancy {}",
                    delivery.id, delivery.pregnancy_id
                ))
            })?;
            if pregnancy.patient_id != delivery.patient_id {
                return Err(integrity(format!(
                    "delivery {} patient {} does not match pregnancy {} patient {}",
                    delivery.id, delivery.patient_id, pregnancy.id, pregnancy.patient_id
                )));
            }
        }

        for visit in &self.visits {
            if !patients.contains(&visit.patient_id) {
                return Err(integrity(format!(
                    "visit {} references missing patient {}",
                    visit.id, visit.patient_id
                )));
            }
            if !users.contains_key(&visit.provider_id) {
                return Err(integrity(format!(
                    "visit {} references missing provider {}",
                    visit.id, visit.provider_id
                )));
            }
            if let Some(pregnancy_id) = visit.pregnancy_id {
                match pregnancies.get(&pregnancy_id) {
                    Some(p) if p.patient_id == visit.patient_id => {}
                    _ => {
                        return Err(integrity(format!(
                            "visit {} pregnancy {} does not belong to patient {}",
                            visit.id, pregnancy_id, visit.patient_id
                        )))
                    }
                }
            }
            if let Some(delivery_id) = visit.delivery_id {
                match deliveries.get(&delivery_id) {
                    Some(d) if d.patient_id == visit.patient_id => {}
                    _ => {
                        return Err(integrity(format!(
                            "visit {} delivery {} does not belong to patient {}",
                            visit.id, delivery_id, visit.patient_id
                        )))
                    }
                }
            }
        }

        Ok(())
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username.as_str() == username)
    }

    pub fn user_by_token(&self, token: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.token.as_deref() == Some(token))
    }

    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn patient_for_user(&self, user_id: UserId) -> Option<&Patient> {
        self.patients.iter().find(|p| p.user_id == user_id)
    }

    pub fn pregnancy(&self, id: PregnancyId) -> Option<&Pregnancy> {
        self.pregnancies.iter().find(|p| p.id == id)
    }

    pub fn delivery(&self, id: DeliveryId) -> Option<&Delivery> {
        self.deliveries.iter().find(|d| d.id == id)
    }

    /// Build the request actor for an account.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRole` if the stored role is not one of the known roles.
    pub fn actor_for(&self, user: &User) -> RecordsResult<Actor> {
        let role = user.role()?;
        let patient_id = match role {
            Role::Patient => self.patient_for_user(user.id).map(|p| p.id),
            Role::Doctor | Role::Nurse | Role::Admin => None,
        };
        Ok(Actor {
            user_id: user.id,
            role,
            patient_id,
        })
    }

    pub(crate) fn next_patient_id(&self) -> RecordsResult<PatientId> {
        next_id(self.patients.iter().map(|p| p.id.get()), PatientId::new)
    }

    pub(crate) fn next_pregnancy_id(&self) -> RecordsResult<PregnancyId> {
        next_id(self.pregnancies.iter().map(|p| p.id.get()), PregnancyId::new)
    }

    pub(crate) fn next_delivery_id(&self) -> RecordsResult<DeliveryId> {
        next_id(self.deliveries.iter().map(|d| d.id.get()), DeliveryId::new)
    }

    pub(crate) fn next_visit_id(&self) -> RecordsResult<VisitId> {
        next_id(self.visits.iter().map(|v| v.id.get()), VisitId::new)
    }
}

fn integrity(message: String) -> RecordsError {
    RecordsError::Integrity(message)
}

fn ensure_unique<T>(what: &str, values: impl Iterator<Item = T>) -> RecordsResult<()>
where
    T: Eq + Hash + std::fmt::Display,
{
    let mut seen = HashSet::new();
    for value in values {
        let label = value.to_string();
        if !seen.insert(value) {
            return Err(integrity(format!("duplicate {what}: {label}")));
        }
    }
    Ok(())
}

fn next_id<T>(
    existing: impl Iterator<Item = u64>,
    wrap: impl FnOnce(u64) -> Result<T, mhr_types::IdError>,
) -> RecordsResult<T> {
    let next = existing
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| integrity("identifier space exhausted".into()))?;
    wrap(next).map_err(|e| integrity(e.to_string()))
}

/// Shared handle on the records, optionally persisted to a YAML file.
#[derive(Debug)]
pub struct RecordStore {
    records: RwLock<Records>,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Creates a store that lives only in memory.
    pub fn in_memory(records: Records) -> RecordsResult<Self> {
        records.validate()?;
        Ok(Self {
            records: RwLock::new(records),
            path: None,
        })
    }

    /// Opens the YAML-backed store at `path`.
    ///
    /// A missing file is treated as an empty store; it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns `FileRead` if the file exists but cannot be read, or any error from
    /// [`Records::parse`].
    pub fn open(path: &Path) -> RecordsResult<Self> {
        let records = if path.is_file() {
            let text = fs::read_to_string(path).map_err(RecordsError::FileRead)?;
            Records::parse(&text)?
        } else {
            tracing::warn!("records file {} not found; starting empty", path.display());
            Records::default()
        };

        tracing::info!(
            patients = records.patients.len(),
            pregnancies = records.pregnancies.len(),
            deliveries = records.deliveries.len(),
            visits = records.visits.len(),
            "loaded records from {}",
            path.display()
        );

        Ok(Self {
            records: RwLock::new(records),
            path: Some(path.to_path_buf()),
        })
    }

    /// Runs `f` against the current snapshot under a shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&Records) -> T) -> RecordsResult<T> {
        let guard = self
            .records
            .read()
            .map_err(|_| RecordsError::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Applies `f` to a copy of the snapshot, validates and persists the result, then makes
    /// it current. Nothing changes if any step fails.
    pub fn write<T>(&self, f: impl FnOnce(&mut Records) -> RecordsResult<T>) -> RecordsResult<T> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| RecordsError::LockPoisoned)?;

        let mut next = guard.clone();
        let out = f(&mut next)?;
        next.validate()?;
        if let Some(path) = &self.path {
            persist(path, &next)?;
        }
        *guard = next;
        Ok(out)
    }
}

fn persist(path: &Path, records: &Records) -> RecordsResult<()> {
    let rendered = records.render()?;
    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, rendered).map_err(RecordsError::FileWrite)?;
    fs::rename(&tmp_path, path).map_err(RecordsError::FileWrite)
}
