//! Normalized appointment request handed to the host for submission.
//!
//! Built only from a form the evaluator has accepted, with one entry per
//! registered field. Values are stored the way each field's rules define
//! (CURP uppercase without spaces, phone numbers as bare digits, everything
//! else trimmed). Storage widths are field rules, so an accepted form
//! always fits.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::types::{FieldName, FieldSource};
use crate::validation::registry::FieldRegistry;

/// Field values of an accepted form, keyed as the form posts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentRequest {
    /// Correlates the submission with host-side logs.
    pub submission_id: Uuid,
    #[serde(flatten)]
    pub fields: BTreeMap<FieldName, String>,
}

impl AppointmentRequest {
    /// Normalize the value of every registered field. Missing values are
    /// stored empty.
    pub fn from_form(registry: &FieldRegistry, values: &impl FieldSource) -> Self {
        let fields = registry
            .iter()
            .map(|spec| {
                let raw = values.value(&spec.field_name).unwrap_or("");
                (spec.field_name.clone(), spec.normalize(raw))
            })
            .collect();

        Self {
            submission_id: Uuid::now_v7(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::validation::registry::fields;

    fn form(overrides: &[(&str, &str)]) -> HashMap<String, String> {
        let mut values: HashMap<String, String> = [
            (fields::NOMBRE_COMPLETO, "  Ana López Pérez "),
            (fields::CURP, "lopa 010203 mdf rrn09"),
            (fields::NOMBRE, "Ana"),
            (fields::PATERNO, "López"),
            (fields::MATERNO, "Pérez"),
            (fields::TELEFONO, "(555) 123-4567"),
            (fields::CELULAR, "55 1234 5678"),
            (fields::CORREO, "ana@dominio.com"),
            (fields::NIVEL, "3"),
            (fields::MUNICIPIO, "12"),
            (fields::ASUNTO, "4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in overrides {
            values.insert(k.to_string(), v.to_string());
        }
        values
    }

    fn registry() -> FieldRegistry {
        FieldRegistry::appointment_form().unwrap()
    }

    #[test]
    fn normalizes_values() {
        let request = AppointmentRequest::from_form(&registry(), &form(&[]));
        assert_eq!(request.fields.len(), 11);
        assert_eq!(request.field(fields::NOMBRE_COMPLETO), Some("Ana López Pérez"));
        assert_eq!(request.field(fields::CURP), Some("LOPA010203MDFRRN09"));
        assert_eq!(request.field(fields::TELEFONO), Some("5551234567"));
        assert_eq!(request.field(fields::CELULAR), Some("5512345678"));
        assert_eq!(request.field(fields::MUNICIPIO), Some("12"));
    }

    #[test]
    fn serializes_with_form_field_names() {
        let request = AppointmentRequest::from_form(&registry(), &form(&[]));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["nombreCompleto"], "Ana López Pérez");
        assert_eq!(json["curp"], "LOPA010203MDFRRN09");
        assert_eq!(json["celular"], "5512345678");
        assert!(json["submission_id"].is_string());
    }

    #[test]
    fn carries_only_registered_fields() {
        let registry =
            FieldRegistry::from_json(r#"[{"field": "correo"}, {"field": "comentario"}]"#).unwrap();
        let request = AppointmentRequest::from_form(&registry, &form(&[]));

        assert_eq!(request.fields.len(), 2);
        assert_eq!(request.field(fields::CORREO), Some("ana@dominio.com"));
        assert_eq!(request.field("comentario"), Some(""));
        assert_eq!(request.field(fields::CURP), None);
    }

    #[test]
    fn each_request_gets_its_own_id() {
        let a = AppointmentRequest::from_form(&registry(), &form(&[]));
        let b = AppointmentRequest::from_form(&registry(), &form(&[]));
        assert_ne!(a.submission_id, b.submission_id);
    }
}
