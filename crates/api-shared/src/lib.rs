//! # API Shared
//!
//! Shared definitions for the MHR APIs.
//!
//! Contains:
//! - Wire types for request/response bodies (`wire` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//! - Authentication header parsing (usable by the REST API and tooling)
//!
//! Used by `mhr-core` (summary bodies) and `api-rest`.

pub mod auth;
pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
