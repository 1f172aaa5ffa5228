use crate::wire::HealthRes;

/// Health check served by the REST API.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Reports liveness without touching the record store.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "MHR is alive".into(),
        }
    }
}
