//! Contract between the engine and the form binding host.
//!
//! The host owns the rendered form: field values, error slots, the submit
//! control and the success indicator. The engine decides what to show and
//! calls back through [`FormHost`]; it never touches the page itself.

use std::time::Duration;

use crate::request::AppointmentRequest;
use crate::types::FieldSource;

pub trait FormHost: FieldSource {
    /// Put `message` in the error slot next to `field`.
    fn show_error(&mut self, field: &str, message: &str);

    /// Empty the error slot next to `field`.
    fn clear_error(&mut self, field: &str);

    /// Add or remove the visual error state on `field`.
    fn set_error_state(&mut self, field: &str, invalid: bool);

    fn set_submit_enabled(&mut self, enabled: bool);

    fn set_submit_label(&mut self, label: &str);

    /// Start showing the success indicator, fading in over `fade`.
    fn show_success(&mut self, fade: Duration);

    /// Start hiding the success indicator, fading out over `fade`.
    fn hide_success(&mut self, fade: Duration);

    /// Perform the real submission. Called once, as the last step.
    fn submit(&mut self, request: &AppointmentRequest);

    /// Display-only input hint.
    fn set_placeholder(&mut self, _field: &str, _text: &str) {}
}
