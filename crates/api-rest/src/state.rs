use mhr_core::{AnalyticsService, CoreConfig, NestingPolicy, RecordService, RecordStore};
use mhr_core::RecordsResult;
use std::sync::Arc;

/// Application state for the REST API server
///
/// Shared by every handler. The services hold the same store, so reads and writes through
/// either see one set of records.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub analytics: AnalyticsService,
    pub records: RecordService,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>, policy: NestingPolicy) -> Self {
        Self {
            analytics: AnalyticsService::new(store.clone(), policy),
            records: RecordService::new(store.clone(), policy),
            store,
        }
    }

    /// Opens the records file named by `cfg` and builds the state around it.
    ///
    /// # Errors
    ///
    /// Returns any error from [`RecordStore::open`].
    pub fn from_config(cfg: &CoreConfig) -> RecordsResult<Self> {
        let store = RecordStore::open(&cfg.records_path())?;
        Ok(Self::new(Arc::new(store), cfg.nesting_policy()))
    }
}
