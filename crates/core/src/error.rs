use crate::kind::RecordKind;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no user named {0}")]
    UnknownUser(String),
    #[error("unrecognised role: {0}")]
    UnknownRole(String),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("No patient profile is linked to this account")]
    PatientProfileNotFound,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("No {} found", .0.plural())]
    NoRecords(RecordKind),

    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("record store integrity violation: {0}")]
    Integrity(String),

    #[error("failed to read records file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write records file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to parse records file: {0}")]
    YamlDeserialization(String),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("record store lock poisoned")]
    LockPoisoned,
}

pub type RecordsResult<T> = std::result::Result<T, RecordsError>;
