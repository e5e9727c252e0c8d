//! Post-validation completion sequence.
//!
//! Once the form is accepted the host walks through a fixed list of timed
//! steps: lock the submit control, show the success indicator, wait, hide
//! the indicator, unlock the control, submit. The steps never overlap and
//! run on a single task; a [`CompletionSequence`] is consumed by
//! [`CompletionSequence::run`], so the same hand-off cannot run twice.

use std::time::Duration;

use crate::host::FormHost;
use crate::request::AppointmentRequest;

/// Submit control label while the sequence is running.
pub const SUBMIT_LABEL_BUSY: &str = "Generando...";

/// Submit control label restored right before submitting.
pub const SUBMIT_LABEL_IDLE: &str = "Generar Turno";

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

pub const DEFAULT_FADE_IN: Duration = Duration::from_millis(300);
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_HOLD: Duration = Duration::from_millis(2000);
pub const DEFAULT_FADE_OUT: Duration = Duration::from_millis(400);

/// Durations of the timed steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionTimings {
    /// Success indicator fade-in. Runs alongside `submit_delay`.
    pub fade_in: Duration,
    /// Wait after showing the indicator.
    pub submit_delay: Duration,
    /// How long the indicator stays fully visible after `submit_delay`.
    pub hold: Duration,
    /// Success indicator fade-out; submission follows its completion.
    pub fade_out: Duration,
}

impl Default for CompletionTimings {
    fn default() -> Self {
        Self {
            fade_in: DEFAULT_FADE_IN,
            submit_delay: DEFAULT_SUBMIT_DELAY,
            hold: DEFAULT_HOLD,
            fade_out: DEFAULT_FADE_OUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStep {
    DisableControl,
    ShowSuccess { fade: Duration },
    Wait(Duration),
    HideSuccess { fade: Duration },
    EnableControl,
    Submit,
}

impl CompletionStep {
    /// Time the step keeps the sequence busy before the next step starts.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Wait(d) => *d,
            _ => Duration::ZERO,
        }
    }
}

/// The ordered steps for one accepted form, plus the request to submit.
#[derive(Debug, Clone)]
pub struct CompletionSequence {
    steps: Vec<CompletionStep>,
    request: AppointmentRequest,
}

impl CompletionSequence {
    pub fn new(request: AppointmentRequest, timings: CompletionTimings) -> Self {
        let steps = vec![
            CompletionStep::DisableControl,
            CompletionStep::ShowSuccess {
                fade: timings.fade_in,
            },
            CompletionStep::Wait(timings.submit_delay),
            CompletionStep::Wait(timings.hold),
            CompletionStep::HideSuccess {
                fade: timings.fade_out,
            },
            // Submission waits for the fade-out to finish.
            CompletionStep::Wait(timings.fade_out),
            CompletionStep::EnableControl,
            CompletionStep::Submit,
        ];
        Self { steps, request }
    }

    pub fn steps(&self) -> &[CompletionStep] {
        &self.steps
    }

    pub fn request(&self) -> &AppointmentRequest {
        &self.request
    }

    /// Time from the first step to the submission.
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(CompletionStep::duration).sum()
    }

    /// Drive the host through every step in order.
    pub async fn run<H: FormHost>(self, host: &mut H) {
        let submission_id = self.request.submission_id;
        tracing::info!(
            %submission_id,
            total_ms = self.total_duration().as_millis() as u64,
            "Starting completion sequence",
        );

        for step in &self.steps {
            tracing::debug!(%submission_id, ?step, "Completion step");
            match *step {
                CompletionStep::DisableControl => {
                    host.set_submit_enabled(false);
                    host.set_submit_label(SUBMIT_LABEL_BUSY);
                }
                CompletionStep::ShowSuccess { fade } => host.show_success(fade),
                CompletionStep::Wait(d) => tokio::time::sleep(d).await,
                CompletionStep::HideSuccess { fade } => host.hide_success(fade),
                CompletionStep::EnableControl => {
                    host.set_submit_enabled(true);
                    host.set_submit_label(SUBMIT_LABEL_IDLE);
                }
                CompletionStep::Submit => host.submit(&self.request),
            }
        }

        tracing::info!(%submission_id, "Appointment request submitted");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tokio::time::Instant;

    use super::*;
    use crate::types::FieldSource;
    use crate::validation::registry::{fields, FieldRegistry};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Enabled(bool),
        Label(String),
        Show(Duration),
        Hide(Duration),
        Submit(String),
    }

    struct RecordingHost {
        start: Instant,
        values: BTreeMap<String, String>,
        events: Vec<(u128, Event)>,
    }

    impl RecordingHost {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                values: BTreeMap::new(),
                events: Vec::new(),
            }
        }

        fn record(&mut self, event: Event) {
            self.events.push((self.start.elapsed().as_millis(), event));
        }
    }

    impl FieldSource for RecordingHost {
        fn value(&self, field: &str) -> Option<&str> {
            self.values.value(field)
        }
    }

    impl FormHost for RecordingHost {
        fn show_error(&mut self, _field: &str, _message: &str) {}
        fn clear_error(&mut self, _field: &str) {}
        fn set_error_state(&mut self, _field: &str, _invalid: bool) {}
        fn set_submit_enabled(&mut self, enabled: bool) {
            self.record(Event::Enabled(enabled));
        }
        fn set_submit_label(&mut self, label: &str) {
            self.record(Event::Label(label.to_string()));
        }
        fn show_success(&mut self, fade: Duration) {
            self.record(Event::Show(fade));
        }
        fn hide_success(&mut self, fade: Duration) {
            self.record(Event::Hide(fade));
        }
        fn submit(&mut self, request: &AppointmentRequest) {
            let curp = request.field(fields::CURP).unwrap_or_default();
            self.record(Event::Submit(curp.to_string()));
        }
    }

    fn request() -> AppointmentRequest {
        let values: BTreeMap<String, String> = [
            (fields::NOMBRE_COMPLETO, "Ana López Pérez"),
            (fields::CURP, "LOPA010203MDFRRN09"),
            (fields::NOMBRE, "Ana"),
            (fields::PATERNO, "López"),
            (fields::MATERNO, "Pérez"),
            (fields::TELEFONO, "5551234"),
            (fields::CELULAR, "5512345678"),
            (fields::CORREO, "ana@dominio.com"),
            (fields::NIVEL, "3"),
            (fields::MUNICIPIO, "12"),
            (fields::ASUNTO, "4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        AppointmentRequest::from_form(&FieldRegistry::appointment_form().unwrap(), &values)
    }

    #[test]
    fn default_sequence_takes_3400ms() {
        let seq = CompletionSequence::new(request(), CompletionTimings::default());
        assert_eq!(seq.total_duration(), Duration::from_millis(3400));
        assert_eq!(seq.steps().first(), Some(&CompletionStep::DisableControl));
        assert_eq!(seq.steps().last(), Some(&CompletionStep::Submit));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_steps_in_order_with_timing() {
        let mut host = RecordingHost::new();
        let seq = CompletionSequence::new(request(), CompletionTimings::default());
        seq.run(&mut host).await;

        assert_eq!(
            host.events,
            vec![
                (0, Event::Enabled(false)),
                (0, Event::Label(SUBMIT_LABEL_BUSY.to_string())),
                (0, Event::Show(DEFAULT_FADE_IN)),
                (3000, Event::Hide(DEFAULT_FADE_OUT)),
                (3400, Event::Enabled(true)),
                (3400, Event::Label(SUBMIT_LABEL_IDLE.to_string())),
                (3400, Event::Submit("LOPA010203MDFRRN09".to_string())),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn custom_timings_are_respected() {
        let timings = CompletionTimings {
            fade_in: Duration::from_millis(10),
            submit_delay: Duration::from_millis(20),
            hold: Duration::from_millis(30),
            fade_out: Duration::from_millis(40),
        };
        let mut host = RecordingHost::new();
        CompletionSequence::new(request(), timings).run(&mut host).await;

        let submits: Vec<_> = host
            .events
            .iter()
            .filter(|(_, e)| matches!(e, Event::Submit(_)))
            .collect();
        assert_eq!(submits.len(), 1);
        assert_eq!(submits[0].0, 90);
    }
}
