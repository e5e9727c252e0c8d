//! Drives one form through the orchestrator the way a page session would:
//! initial pass, one input event per filled field, then a submit attempt.

use std::collections::BTreeMap;

use serde_json::Value;
use turno_core::orchestrator::{Orchestrator, SubmitAttempt};
use turno_core::request::AppointmentRequest;
use turno_core::validation::rules::FieldViolation;

use crate::config::HostConfig;
use crate::console::ConsoleHost;

/// How a form session ended.
#[derive(Debug)]
pub enum FormReport {
    Submitted(AppointmentRequest),
    Incomplete(Vec<FieldViolation>),
}

/// Turn a JSON object of form values into strings.
///
/// Selections often arrive as numeric ids, so numbers and booleans are
/// rendered as text; `null` reads as an empty field.
pub fn values_from_json(json: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let object: BTreeMap<String, Value> = serde_json::from_str(json)?;
    Ok(object
        .into_iter()
        .map(|(field, value)| {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            (field, text)
        })
        .collect())
}

/// Run one form session to completion.
pub async fn run_form(
    values: BTreeMap<String, String>,
    config: &HostConfig,
) -> anyhow::Result<FormReport> {
    let registry = config.load_registry()?;
    let mut orchestrator = Orchestrator::new(registry, config.timings);
    let mut host = ConsoleHost::new(values);

    orchestrator.initialize(&mut host)?;
    for field in host.field_names() {
        orchestrator.handle_input(&mut host, &field)?;
    }

    match orchestrator.begin_submission(&mut host)? {
        SubmitAttempt::Rejected(validity) => {
            Ok(FormReport::Incomplete(validity.violations().cloned().collect()))
        }
        SubmitAttempt::Accepted(sequence) => {
            sequence.run(&mut host).await;
            host.into_submitted()
                .map(FormReport::Submitted)
                .ok_or_else(|| anyhow::anyhow!("completion sequence finished without submitting"))
        }
    }
}
