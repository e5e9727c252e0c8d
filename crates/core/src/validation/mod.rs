//! Field validation engine.
//!
//! Pure predicates (names, CURP, phones, email), the rule and result types,
//! the field rule registry, and the evaluator that applies a registry to a
//! set of field values. Nothing here touches the host.

pub mod curp;
pub mod email;
pub mod evaluator;
pub mod predicates;
pub mod registry;
pub mod rules;
