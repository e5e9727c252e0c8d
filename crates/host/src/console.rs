//! In-memory form binding host.
//!
//! Keeps the field values and everything a page would display (error
//! slots, error states, submit control, success indicator) so the binary
//! can print it and tests can inspect it.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use turno_core::host::FormHost;
use turno_core::request::AppointmentRequest;
use turno_core::submission::SUBMIT_LABEL_IDLE;
use turno_core::types::FieldSource;

#[derive(Debug, Clone)]
pub struct ConsoleHost {
    values: BTreeMap<String, String>,
    errors: BTreeMap<String, String>,
    error_states: BTreeSet<String>,
    placeholders: BTreeMap<String, String>,
    submit_enabled: bool,
    submit_label: String,
    success_visible: bool,
    submitted: Option<AppointmentRequest>,
}

impl ConsoleHost {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self {
            values,
            errors: BTreeMap::new(),
            error_states: BTreeSet::new(),
            placeholders: BTreeMap::new(),
            submit_enabled: false,
            submit_label: SUBMIT_LABEL_IDLE.to_string(),
            success_visible: false,
            submitted: None,
        }
    }

    /// Change a value, as typing into the field would.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    pub fn field_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Currently rendered error messages by field.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn has_error_state(&self, field: &str) -> bool {
        self.error_states.contains(field)
    }

    pub fn placeholder(&self, field: &str) -> Option<&str> {
        self.placeholders.get(field).map(String::as_str)
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn submit_label(&self) -> &str {
        &self.submit_label
    }

    pub fn success_visible(&self) -> bool {
        self.success_visible
    }

    pub fn submitted(&self) -> Option<&AppointmentRequest> {
        self.submitted.as_ref()
    }

    pub fn into_submitted(self) -> Option<AppointmentRequest> {
        self.submitted
    }
}

impl FieldSource for ConsoleHost {
    fn value(&self, field: &str) -> Option<&str> {
        self.values.value(field)
    }
}

impl FormHost for ConsoleHost {
    fn show_error(&mut self, field: &str, message: &str) {
        tracing::debug!(field, message, "Show field error");
        self.errors.insert(field.to_string(), message.to_string());
    }

    fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    fn set_error_state(&mut self, field: &str, invalid: bool) {
        if invalid {
            self.error_states.insert(field.to_string());
        } else {
            self.error_states.remove(field);
        }
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn set_submit_label(&mut self, label: &str) {
        self.submit_label = label.to_string();
    }

    fn show_success(&mut self, fade: Duration) {
        tracing::info!(fade_ms = fade.as_millis() as u64, "Success indicator shown");
        self.success_visible = true;
    }

    fn hide_success(&mut self, fade: Duration) {
        tracing::info!(fade_ms = fade.as_millis() as u64, "Success indicator hidden");
        self.success_visible = false;
    }

    fn submit(&mut self, request: &AppointmentRequest) {
        if self.submitted.is_some() {
            tracing::error!(submission_id = %request.submission_id, "Duplicate submission ignored");
            return;
        }
        self.submitted = Some(request.clone());
    }

    fn set_placeholder(&mut self, field: &str, text: &str) {
        self.placeholders.insert(field.to_string(), text.to_string());
    }
}
