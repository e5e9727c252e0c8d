//! Rule evaluator: pure logic, no host access.

use std::collections::BTreeMap;

use super::registry::FieldRegistry;
use super::rules::{FailureKind, FieldOutcome, FieldRuleSpec, FieldViolation, FormValidity};
use crate::types::FieldSource;

/// Evaluate every registered field against the current values.
///
/// Each field is judged on its own value only, so the order fields are
/// visited in has no effect on the result.
pub fn evaluate_form(registry: &FieldRegistry, values: &impl FieldSource) -> FormValidity {
    let per_field: BTreeMap<_, _> = registry
        .iter()
        .map(|spec| {
            let value = values.value(&spec.field_name).unwrap_or("");
            (spec.field_name.clone(), evaluate_field(spec, value))
        })
        .collect();

    let all_valid = per_field.values().all(FieldOutcome::is_ok);
    FormValidity {
        per_field,
        all_valid,
    }
}

/// Evaluate one field: required, then predicates in order, then minimum
/// length, then maximum length of the stored value. The first failing rule
/// is reported.
pub fn evaluate_field(spec: &FieldRuleSpec, value: &str) -> FieldOutcome {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if spec.required {
            FieldOutcome::Invalid(violation(spec, FailureKind::Required, None))
        } else {
            // Optional and empty: nothing else applies.
            FieldOutcome::Valid
        };
    }

    if let Some(v) = evaluate_predicates(spec, value) {
        return FieldOutcome::Invalid(v);
    }
    if let Some(v) = evaluate_min_length(spec, trimmed) {
        return FieldOutcome::Invalid(v);
    }
    if let Some(v) = evaluate_max_length(spec, value) {
        return FieldOutcome::Invalid(v);
    }
    FieldOutcome::Valid
}

fn violation(spec: &FieldRuleSpec, kind: FailureKind, reason: Option<String>) -> FieldViolation {
    FieldViolation {
        field: spec.field_name.clone(),
        kind,
        message: spec.message_for(kind),
        reason,
    }
}

fn evaluate_predicates(spec: &FieldRuleSpec, value: &str) -> Option<FieldViolation> {
    spec.predicates.iter().find_map(|&predicate| {
        let outcome = predicate.evaluate(value);
        if outcome.ok {
            None
        } else {
            Some(violation(
                spec,
                FailureKind::Predicate(predicate),
                outcome.reason,
            ))
        }
    })
}

fn evaluate_min_length(spec: &FieldRuleSpec, trimmed: &str) -> Option<FieldViolation> {
    let min = spec.min_length?;
    let len = trimmed.chars().count();
    if len < min {
        Some(violation(
            spec,
            FailureKind::MinLength,
            Some(format!("{len} de {min} caracteres")),
        ))
    } else {
        None
    }
}

fn evaluate_max_length(spec: &FieldRuleSpec, value: &str) -> Option<FieldViolation> {
    let max = spec.max_length?;
    let len = spec.normalize(value).chars().count();
    if len > max {
        Some(violation(
            spec,
            FailureKind::MaxLength,
            Some(format!("{len} de {max} caracteres")),
        ))
    } else {
        None
    }
}
