//! `turno-host` library crate.
//!
//! A headless form binding host for the appointment-request form: it feeds
//! field values to the orchestrator, collects what a page would render, and
//! runs the completion sequence. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod console;
pub mod runner;
