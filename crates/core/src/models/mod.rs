//! Record model: users, patients and the clinical records hanging off them.
//!
//! These types are the on-disk (YAML) representation as well as the in-memory one. Field
//! names follow the wire contract of the records API.

pub mod delivery;
pub mod patient;
pub mod pregnancy;
pub mod user;
pub mod visit;

pub use delivery::{Delivery, DeliveryMode, NewDelivery};
pub use patient::{NewPatient, Patient};
pub use pregnancy::{BloodType, NewPregnancy, Pregnancy};
pub use user::{Actor, Role, User};
pub use visit::{NewVisit, Visit, VisitType};
