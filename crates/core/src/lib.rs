//! `turno-core`: validation engine for the appointment-request form.
//!
//! Pure field predicates (names, CURP, phones, email), a declarative field
//! rule registry, the orchestrator that drives a form host, and the timed
//! completion sequence that hands a validated request off for submission.

pub mod error;
pub mod host;
pub mod orchestrator;
pub mod request;
pub mod submission;
pub mod types;
pub mod validation;
