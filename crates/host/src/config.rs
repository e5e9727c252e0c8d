//! Environment configuration for the form host.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use turno_core::submission::{
    CompletionTimings, DEFAULT_FADE_IN, DEFAULT_FADE_OUT, DEFAULT_HOLD, DEFAULT_SUBMIT_DELAY,
};
use turno_core::validation::registry::FieldRegistry;

/// Host configuration loaded from environment variables.
///
/// Every field has a default matching the production form, so running
/// without any variables set behaves like the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Completion sequence step durations.
    pub timings: CompletionTimings,
    /// Optional JSON rule table replacing the built-in appointment form.
    pub rules_path: Option<PathBuf>,
}

impl HostConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `TURNO_SUCCESS_FADE_IN_MS`  | `300`   |
    /// | `TURNO_SUBMIT_DELAY_MS`     | `1000`  |
    /// | `TURNO_SUCCESS_HOLD_MS`     | `2000`  |
    /// | `TURNO_SUCCESS_FADE_OUT_MS` | `400`   |
    /// | `TURNO_FORM_RULES`          | unset   |
    ///
    /// Values that do not parse fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let timings = CompletionTimings {
            fade_in: millis("TURNO_SUCCESS_FADE_IN_MS", DEFAULT_FADE_IN),
            submit_delay: millis("TURNO_SUBMIT_DELAY_MS", DEFAULT_SUBMIT_DELAY),
            hold: millis("TURNO_SUCCESS_HOLD_MS", DEFAULT_HOLD),
            fade_out: millis("TURNO_SUCCESS_FADE_OUT_MS", DEFAULT_FADE_OUT),
        };

        let rules_path = lookup("TURNO_FORM_RULES")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            timings,
            rules_path,
        }
    }

    /// Build the field registry: the rule file if configured, otherwise the
    /// built-in appointment form.
    pub fn load_registry(&self) -> anyhow::Result<FieldRegistry> {
        let registry = match &self.rules_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading rule table {}", path.display()))?;
                FieldRegistry::from_json(&json)
                    .with_context(|| format!("loading rule table {}", path.display()))?
            }
            None => FieldRegistry::appointment_form()?,
        };
        Ok(registry)
    }
}
