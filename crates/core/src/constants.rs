//! Constants used throughout the MHR core crate.

/// Default directory holding the records file when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "patient_data";

/// Filename of the YAML records snapshot inside the data directory.
pub const RECORDS_FILENAME: &str = "records.yaml";

/// Category key used when a grouped field has no value, so that grouped counts still sum to
/// the total.
pub const UNSPECIFIED_CATEGORY: &str = "unspecified";

/// Accepted range for `Pregnancy::gestational_age_weeks`.
pub const GESTATIONAL_AGE_WEEKS: std::ops::RangeInclusive<u16> = 0..=46;

/// Accepted range for `Delivery::birth_weight_g`.
pub const BIRTH_WEIGHT_G: std::ops::RangeInclusive<u32> = 200..=7000;

/// Accepted range for APGAR scores.
pub const APGAR_SCORE: std::ops::RangeInclusive<u8> = 0..=10;

/// Accepted range for maternal heart rate at a visit.
pub const HEART_RATE: std::ops::RangeInclusive<u16> = 30..=220;

/// Accepted range for fetal heart rate at a visit.
pub const FETAL_HEART_RATE: std::ops::RangeInclusive<u16> = 50..=220;
