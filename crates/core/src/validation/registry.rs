//! Field rule registry.
//!
//! Rules are declared as [`FieldRuleConfig`] entries (the built-in
//! appointment form, or JSON supplied by the host) and checked once when the
//! registry is built. Any reference to an unknown predicate or message kind
//! is a configuration error; the engine refuses to start rather than
//! silently skipping a rule.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::predicates::PredicateName;
use super::rules::{FailureKind, FieldRuleSpec};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field names of the appointment form
// ---------------------------------------------------------------------------

pub mod fields {
    pub const NOMBRE_COMPLETO: &str = "nombreCompleto";
    pub const CURP: &str = "curp";
    pub const NOMBRE: &str = "nombre";
    pub const PATERNO: &str = "paterno";
    pub const MATERNO: &str = "materno";
    pub const TELEFONO: &str = "telefono";
    pub const CELULAR: &str = "celular";
    pub const CORREO: &str = "correo";
    pub const NIVEL: &str = "nivel";
    pub const MUNICIPIO: &str = "municipio";
    pub const ASUNTO: &str = "asunto";
}

/// Storage column widths of the appointment record, in characters.
pub mod widths {
    pub const FULL_NAME: usize = 120;
    pub const GIVEN_NAME: usize = 100;
    pub const SURNAME: usize = 60;
    pub const CURP: usize = 18;
    pub const PHONE: usize = 10;
    pub const EMAIL: usize = 150;
}

// ---------------------------------------------------------------------------
// Declarative configuration
// ---------------------------------------------------------------------------

/// One field's rules as written in a rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FieldRuleConfig {
    pub field: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub predicates: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub min_length: Option<usize>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_length: Option<usize>,
    /// Keyed by failure kind: `required`, `minlength`, `maxlength` or a
    /// predicate name.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

fn rule(
    field: &str,
    predicates: &[&str],
    (min_length, max_length): (Option<usize>, Option<usize>),
    messages: &[(&str, &str)],
) -> FieldRuleConfig {
    FieldRuleConfig {
        field: field.to_string(),
        required: true,
        predicates: predicates.iter().map(|p| p.to_string()).collect(),
        min_length,
        max_length,
        messages: messages
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        placeholder: None,
    }
}

fn with_placeholder(mut config: FieldRuleConfig, placeholder: &str) -> FieldRuleConfig {
    config.placeholder = Some(placeholder.to_string());
    config
}

/// Rule table of the appointment-request form.
pub fn appointment_form_config() -> Vec<FieldRuleConfig> {
    use fields::*;

    vec![
        rule(
            NOMBRE_COMPLETO,
            &["nameCheck"],
            (Some(5), Some(widths::FULL_NAME)),
            &[
                ("required", "El nombre completo es requerido"),
                ("minlength", "Mínimo 5 caracteres"),
            ],
        ),
        with_placeholder(
            rule(
                CURP,
                &["curpCheck"],
                (None, Some(widths::CURP)),
                &[("required", "La CURP es requerida")],
            ),
            "Ej: ABCD010203HDFRRN09",
        ),
        rule(
            NOMBRE,
            &["nameCheck"],
            (Some(2), Some(widths::GIVEN_NAME)),
            &[("required", "El nombre es requerido")],
        ),
        rule(
            PATERNO,
            &["nameCheck"],
            (Some(2), Some(widths::SURNAME)),
            &[("required", "El apellido paterno es requerido")],
        ),
        rule(
            MATERNO,
            &["nameCheck"],
            (Some(2), Some(widths::SURNAME)),
            &[
                ("required", "El apellido materno es requerido"),
                ("nameCheck", "Formato de apellido inválido"),
            ],
        ),
        with_placeholder(
            rule(
                TELEFONO,
                &["phoneCheck"],
                (None, Some(widths::PHONE)),
                &[
                    ("required", "El teléfono es requerido"),
                    ("phoneCheck", "Teléfono inválido (7-10 dígitos)"),
                ],
            ),
            "7-10 dígitos",
        ),
        with_placeholder(
            rule(
                CELULAR,
                &["celularCheck"],
                (None, Some(widths::PHONE)),
                &[
                    ("required", "El número celular es requerido"),
                    ("celularCheck", "Celular inválido (10 dígitos)"),
                ],
            ),
            "10 dígitos",
        ),
        with_placeholder(
            rule(
                CORREO,
                &["emailAdvanced"],
                (None, Some(widths::EMAIL)),
                &[
                    ("required", "El correo electrónico es requerido"),
                    ("emailAdvanced", "Correo electrónico inválido"),
                ],
            ),
            "ejemplo@dominio.com",
        ),
        rule(
            NIVEL,
            &[],
            (None, None),
            &[("required", "Por favor seleccione un nivel educativo")],
        ),
        rule(
            MUNICIPIO,
            &[],
            (None, None),
            &[("required", "Por favor seleccione un municipio")],
        ),
        rule(
            ASUNTO,
            &[],
            (None, None),
            &[("required", "Por favor seleccione un asunto")],
        ),
    ]
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Checked, immutable set of field rules in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: Vec<FieldRuleSpec>,
}

impl FieldRegistry {
    /// Registry of the appointment-request form.
    pub fn appointment_form() -> Result<Self, CoreError> {
        Self::from_config(appointment_form_config())
    }

    /// Parse a JSON array of [`FieldRuleConfig`] and build the registry.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let configs: Vec<FieldRuleConfig> = serde_json::from_str(json)
            .map_err(|e| CoreError::Configuration(format!("Invalid rule table: {e}")))?;
        Self::from_config(configs)
    }

    /// Check every entry and build the registry.
    pub fn from_config(configs: Vec<FieldRuleConfig>) -> Result<Self, CoreError> {
        if configs.is_empty() {
            return Err(CoreError::Configuration(
                "Rule table must declare at least one field".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(configs.len());
        for config in configs {
            let spec = build_spec(config)?;
            if !seen.insert(spec.field_name.clone()) {
                return Err(CoreError::Configuration(format!(
                    "Field '{}' is declared more than once",
                    spec.field_name
                )));
            }
            fields.push(spec);
        }

        tracing::info!(field_count = fields.len(), "Field rule registry loaded");
        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&FieldRuleSpec> {
        self.fields.iter().find(|s| s.field_name == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRuleSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn build_spec(config: FieldRuleConfig) -> Result<FieldRuleSpec, CoreError> {
    let field = config.field.trim();
    if field.is_empty() {
        return Err(CoreError::Configuration(
            "Field name must not be empty".to_string(),
        ));
    }

    let predicates = config
        .predicates
        .iter()
        .map(|p| PredicateName::parse(p))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| in_field(field, e))?;

    config.validate().map_err(|e| {
        CoreError::Configuration(format!("Field '{field}': invalid length rule: {e}"))
    })?;
    if let (Some(min), Some(max)) = (config.min_length, config.max_length) {
        if min > max {
            return Err(CoreError::Configuration(format!(
                "Field '{field}': min_length {min} exceeds max_length {max}"
            )));
        }
    }

    let mut spec = FieldRuleSpec {
        field_name: field.to_string(),
        required: config.required,
        predicates,
        min_length: config.min_length,
        max_length: config.max_length,
        messages: BTreeMap::new(),
        placeholder: config.placeholder,
    };

    let kinds = spec.failure_kinds();
    for (key, message) in config.messages {
        let kind = FailureKind::parse(&key).map_err(|e| in_field(field, e))?;
        if !kinds.contains(&kind) {
            return Err(CoreError::Configuration(format!(
                "Field '{field}' has a '{key}' message but no such rule"
            )));
        }
        if message.trim().is_empty() {
            return Err(CoreError::Configuration(format!(
                "Field '{field}': message for '{key}' is empty"
            )));
        }
        spec.messages.insert(kind, message);
    }

    Ok(spec)
}

/// Prefix a configuration error with the field it came from.
fn in_field(field: &str, err: CoreError) -> CoreError {
    match err {
        CoreError::Configuration(msg) => CoreError::Configuration(format!("Field '{field}': {msg}")),
        other => other,
    }
}
