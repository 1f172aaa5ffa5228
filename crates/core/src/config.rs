//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables.

use crate::constants::RECORDS_FILENAME;
use crate::scope::NestingPolicy;
use crate::{RecordsError, RecordsResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    nesting_policy: NestingPolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `RecordsError::InvalidInput` if `data_dir` is not an existing directory.
    pub fn new(data_dir: PathBuf, nesting_policy: NestingPolicy) -> RecordsResult<Self> {
        if !data_dir.is_dir() {
            return Err(RecordsError::InvalidInput(format!(
                "data directory does not exist: {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            data_dir,
            nesting_policy,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILENAME)
    }

    pub fn nesting_policy(&self) -> NestingPolicy {
        self.nesting_policy
    }
}

/// Parse the nesting policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`NestingPolicy::PairwiseOwnership`].
pub fn nesting_policy_from_env_value(value: Option<String>) -> RecordsResult<NestingPolicy> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<NestingPolicy>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}
