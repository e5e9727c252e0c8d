//! Validation rule and result types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::predicates::PredicateName;
use crate::error::CoreError;
use crate::types::FieldName;

/// Shown when a required field is empty and the field has no own message.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "Este campo es obligatorio.";

/// Result of a single predicate: pass, or fail with a diagnostic reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}

/// Why a field was rejected. Message tables are keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// Required field left empty.
    Required,
    /// Value shorter than the field's minimum length.
    MinLength,
    /// Stored value longer than the field's maximum length.
    MaxLength,
    /// Value present but rejected by a content predicate.
    Predicate(PredicateName),
}

impl FailureKind {
    /// Parse the key used in message tables (`required`, `minlength`,
    /// `maxlength`, or a predicate name such as `curpCheck`).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "required" => Ok(Self::Required),
            "minlength" => Ok(Self::MinLength),
            "maxlength" => Ok(Self::MaxLength),
            other => PredicateName::parse(other).map(Self::Predicate),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minlength",
            Self::MaxLength => "maxlength",
            Self::Predicate(p) => p.as_str(),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FailureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Everything the engine knows about one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRuleSpec {
    pub field_name: FieldName,
    pub required: bool,
    /// Content predicates, evaluated in this order.
    pub predicates: Vec<PredicateName>,
    pub min_length: Option<usize>,
    /// Limit on the stored (normalized) value, in characters.
    pub max_length: Option<usize>,
    /// Per-field overrides; kinds without an entry use the default message.
    pub messages: BTreeMap<FailureKind, String>,
    /// Display-only input hint.
    pub placeholder: Option<String>,
}

impl FieldRuleSpec {
    /// Resolve the message shown for `kind` on this field.
    pub fn message_for(&self, kind: FailureKind) -> String {
        if let Some(msg) = self.messages.get(&kind) {
            return msg.clone();
        }
        match kind {
            FailureKind::Required => DEFAULT_REQUIRED_MESSAGE.to_string(),
            FailureKind::MinLength => default_min_length_message(self.min_length.unwrap_or(0)),
            FailureKind::MaxLength => default_max_length_message(self.max_length.unwrap_or(0)),
            FailureKind::Predicate(p) => p.default_message().to_string(),
        }
    }

    /// Every failure kind this field can report.
    pub fn failure_kinds(&self) -> Vec<FailureKind> {
        let mut kinds = Vec::with_capacity(self.predicates.len() + 3);
        if self.required {
            kinds.push(FailureKind::Required);
        }
        kinds.extend(self.predicates.iter().copied().map(FailureKind::Predicate));
        if self.min_length.is_some() {
            kinds.push(FailureKind::MinLength);
        }
        if self.max_length.is_some() {
            kinds.push(FailureKind::MaxLength);
        }
        kinds
    }

    /// The value as it is stored once the form is accepted: trimmed, or
    /// reformatted by the first predicate that defines a stored form.
    pub fn normalize(&self, value: &str) -> String {
        self.predicates
            .iter()
            .find_map(|p| p.normalize(value))
            .unwrap_or_else(|| value.trim().to_string())
    }
}

fn default_min_length_message(min: usize) -> String {
    format!("Por favor, no escribas menos de {min} caracteres.")
}

fn default_max_length_message(max: usize) -> String {
    format!("Por favor, no escribas más de {max} caracteres.")
}

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: FieldName,
    pub kind: FailureKind,
    /// Text rendered next to the field.
    pub message: String,
    /// Diagnostic detail from the predicate, when it gives one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of evaluating every rule of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldOutcome {
    Valid,
    Invalid(FieldViolation),
}

impl FieldOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn violation(&self) -> Option<&FieldViolation> {
        match self {
            Self::Valid => None,
            Self::Invalid(v) => Some(v),
        }
    }
}

/// Whole-form aggregate, recomputed from scratch on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormValidity {
    pub per_field: BTreeMap<FieldName, FieldOutcome>,
    pub all_valid: bool,
}

impl FormValidity {
    pub fn outcome(&self, field: &str) -> Option<&FieldOutcome> {
        self.per_field.get(field)
    }

    pub fn violations(&self) -> impl Iterator<Item = &FieldViolation> {
        self.per_field.values().filter_map(FieldOutcome::violation)
    }
}
