//! Validation orchestrator.
//!
//! Runs the field rules whenever the host reports a change, keeps the
//! per-field and whole-form state, renders errors and submit enablement
//! through the [`FormHost`], and hands the accepted form off as a
//! [`CompletionSequence`].
//!
//! ```text
//! field:  untouched ──input──▶ valid ⇄ invalid
//! form:   untouched ──init───▶ complete ⇄ incomplete ──submit──▶ submitting
//! ```
//!
//! Every pass re-evaluates the whole form from the current values; nothing
//! is carried over from the previous pass except which fields were touched.
//! `submitting` is terminal: the host owns the page from then on.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::CoreError;
use crate::host::FormHost;
use crate::request::AppointmentRequest;
use crate::submission::{CompletionSequence, CompletionTimings};
use crate::types::FieldName;
use crate::validation::evaluator::evaluate_form;
use crate::validation::registry::FieldRegistry;
use crate::validation::rules::{FieldOutcome, FormValidity};

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    /// No input event yet; errors are not rendered.
    Untouched,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    /// Before the first validation pass.
    Untouched,
    Incomplete,
    Complete,
    /// Handed off to the host. Terminal.
    Submitting,
}

/// Result of a submission attempt that did not hit an error.
#[derive(Debug)]
pub enum SubmitAttempt {
    /// The form had invalid fields; their errors are now rendered.
    Rejected(FormValidity),
    /// The form was accepted; run the sequence to finish.
    Accepted(CompletionSequence),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    registry: FieldRegistry,
    timings: CompletionTimings,
    touched: BTreeSet<FieldName>,
    field_states: BTreeMap<FieldName, FieldState>,
    form_state: FormState,
}

impl Orchestrator {
    pub fn new(registry: FieldRegistry, timings: CompletionTimings) -> Self {
        let field_states = registry
            .iter()
            .map(|spec| (spec.field_name.clone(), FieldState::Untouched))
            .collect();
        Self {
            registry,
            timings,
            touched: BTreeSet::new(),
            field_states,
            form_state: FormState::Untouched,
        }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn form_state(&self) -> FormState {
        self.form_state
    }

    /// State of a registered field; `None` for fields the registry lacks.
    pub fn field_state(&self, field: &str) -> Option<FieldState> {
        self.field_states.get(field).copied()
    }

    /// Set placeholders and run the initial pass, which decides whether the
    /// submit control starts enabled.
    pub fn initialize<H: FormHost>(&mut self, host: &mut H) -> Result<FormValidity, CoreError> {
        for spec in self.registry.iter() {
            if let Some(text) = &spec.placeholder {
                host.set_placeholder(&spec.field_name, text);
            }
        }
        self.validate_all(host, false)
    }

    /// A value changed in `field`.
    ///
    /// Marks the field touched and re-evaluates the whole form. Changes to
    /// fields without rules only refresh submit enablement.
    pub fn handle_input<H: FormHost>(
        &mut self,
        host: &mut H,
        field: &str,
    ) -> Result<FormValidity, CoreError> {
        self.ensure_not_submitting()?;
        if self.registry.contains(field) {
            self.touched.insert(field.to_string());
        } else {
            tracing::debug!(field, "Input on field without rules");
        }
        self.run_pass(host)
    }

    /// Re-evaluate every field. With `touch_all`, errors are rendered for
    /// every field, not only those the person has edited.
    pub fn validate_all<H: FormHost>(
        &mut self,
        host: &mut H,
        touch_all: bool,
    ) -> Result<FormValidity, CoreError> {
        self.ensure_not_submitting()?;
        if touch_all {
            self.touched
                .extend(self.registry.iter().map(|s| s.field_name.clone()));
        }
        self.run_pass(host)
    }

    /// Check everything once more and, if the form is complete, hand it off.
    ///
    /// On acceptance the form enters `submitting` and no further events are
    /// processed.
    pub fn begin_submission<H: FormHost>(
        &mut self,
        host: &mut H,
    ) -> Result<SubmitAttempt, CoreError> {
        let validity = self.validate_all(host, true)?;
        if !validity.all_valid {
            tracing::info!(
                invalid_fields = validity.violations().count(),
                "Submission blocked by invalid fields",
            );
            return Ok(SubmitAttempt::Rejected(validity));
        }

        let request = AppointmentRequest::from_form(&self.registry, &*host);
        self.form_state = FormState::Submitting;
        tracing::info!(submission_id = %request.submission_id, "Form handed off for submission");
        Ok(SubmitAttempt::Accepted(CompletionSequence::new(
            request,
            self.timings,
        )))
    }

    fn ensure_not_submitting(&self) -> Result<(), CoreError> {
        if self.form_state == FormState::Submitting {
            tracing::warn!("Event received after hand-off; ignoring");
            return Err(CoreError::Conflict(
                "Form has already been handed off for submission".to_string(),
            ));
        }
        Ok(())
    }

    fn run_pass<H: FormHost>(&mut self, host: &mut H) -> Result<FormValidity, CoreError> {
        let validity = evaluate_form(&self.registry, &*host);

        for (field, outcome) in &validity.per_field {
            if !self.touched.contains(field) {
                continue;
            }
            let next = match outcome {
                FieldOutcome::Valid => {
                    host.clear_error(field);
                    host.set_error_state(field, false);
                    FieldState::Valid
                }
                FieldOutcome::Invalid(v) => {
                    host.show_error(field, &v.message);
                    host.set_error_state(field, true);
                    FieldState::Invalid
                }
            };
            let previous = self.field_states.insert(field.clone(), next);
            if previous != Some(next) {
                tracing::debug!(field = %field, from = ?previous, to = ?next, "Field state changed");
            }
        }

        let next_form = if validity.all_valid {
            FormState::Complete
        } else {
            FormState::Incomplete
        };
        if next_form != self.form_state {
            tracing::info!(from = ?self.form_state, to = ?next_form, "Form state changed");
            self.form_state = next_form;
        }

        host.set_submit_enabled(validity.all_valid);
        Ok(validity)
    }
}
