//! Integration tests for a full form session through the console host.
//!
//! Time is paused, so the completion sequence's sleeps finish instantly
//! while still advancing the clock by the configured durations.

use std::collections::BTreeMap;
use std::time::Duration;

use turno_core::orchestrator::{FormState, Orchestrator, SubmitAttempt};
use turno_core::submission::{CompletionTimings, SUBMIT_LABEL_BUSY, SUBMIT_LABEL_IDLE};
use turno_core::validation::registry::{fields, FieldRegistry};
use turno_host::config::HostConfig;
use turno_host::console::ConsoleHost;
use turno_host::runner::{run_form, values_from_json, FormReport};

const VALID_FORM: &str = r#"{
    "nombreCompleto": "María de los Ángeles Núñez",
    "curp": "numa 850412 mdf nnr 07",
    "nombre": "María de los Ángeles",
    "paterno": "Núñez",
    "materno": "Ramírez",
    "telefono": "722 123 4567",
    "celular": "722-987-6543",
    "correo": "maria.nunez@correo.gob.mx",
    "nivel": 4,
    "municipio": 106,
    "asunto": "2"
}"#;

fn default_config() -> HostConfig {
    HostConfig::from_lookup(|_| None)
}

// ---------------------------------------------------------------------------
// Test: full session
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn valid_form_is_submitted_normalized() {
    let values = values_from_json(VALID_FORM).unwrap();
    let start = tokio::time::Instant::now();

    let report = run_form(values, &default_config()).await.unwrap();

    let request = match report {
        FormReport::Submitted(request) => request,
        FormReport::Incomplete(v) => panic!("form should be complete: {v:?}"),
    };
    assert_eq!(request.field(fields::CURP), Some("NUMA850412MDFNNR07"));
    assert_eq!(request.field(fields::TELEFONO), Some("7221234567"));
    assert_eq!(request.field(fields::CELULAR), Some("7229876543"));
    assert_eq!(request.field(fields::MUNICIPIO), Some("106"));
    assert!(start.elapsed() >= Duration::from_millis(3400));
}

#[tokio::test(start_paused = true)]
async fn oversized_name_is_reported_as_a_field_error() {
    let mut values = values_from_json(VALID_FORM).unwrap();
    values.insert(fields::NOMBRE_COMPLETO.to_string(), "Ana ".repeat(40));

    let report = run_form(values, &default_config()).await.unwrap();

    let violations = match report {
        FormReport::Incomplete(v) => v,
        FormReport::Submitted(r) => panic!("form should be incomplete: {r:?}"),
    };
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, fields::NOMBRE_COMPLETO);
    assert_eq!(
        violations[0].message,
        "Por favor, no escribas más de 120 caracteres."
    );
}

#[tokio::test(start_paused = true)]
async fn incomplete_form_reports_each_field() {
    let values = values_from_json(
        r#"{
            "nombreCompleto": "Ana",
            "curp": "ABCD300229HDFRRN09",
            "nombre": "12345",
            "paterno": "aaaa",
            "materno": "José  Luis",
            "telefono": "123456",
            "celular": "5555555555",
            "correo": "a..b@dominio.com"
        }"#,
    )
    .unwrap();

    let report = run_form(values, &default_config()).await.unwrap();

    let violations = match report {
        FormReport::Incomplete(v) => v,
        FormReport::Submitted(r) => panic!("form should be incomplete: {r:?}"),
    };
    let by_field: BTreeMap<_, _> = violations
        .iter()
        .map(|v| (v.field.as_str(), v.message.as_str()))
        .collect();

    assert_eq!(by_field.len(), 11);
    assert_eq!(by_field[fields::NOMBRE_COMPLETO], "Mínimo 5 caracteres");
    assert_eq!(by_field[fields::CURP], "CURP inválida");
    assert_eq!(by_field[fields::NOMBRE], "Formato de nombre inválido");
    assert_eq!(by_field[fields::PATERNO], "Formato de nombre inválido");
    assert_eq!(by_field[fields::MATERNO], "Formato de apellido inválido");
    assert_eq!(by_field[fields::TELEFONO], "Teléfono inválido (7-10 dígitos)");
    assert_eq!(by_field[fields::CELULAR], "Celular inválido (10 dígitos)");
    assert_eq!(by_field[fields::CORREO], "Correo electrónico inválido");
    assert_eq!(by_field[fields::NIVEL], "Por favor seleccione un nivel educativo");
    assert_eq!(by_field[fields::MUNICIPIO], "Por favor seleccione un municipio");
    assert_eq!(by_field[fields::ASUNTO], "Por favor seleccione un asunto");
}

// ---------------------------------------------------------------------------
// Test: what the host displays along the way
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn host_display_follows_the_completion_sequence() {
    let mut host = ConsoleHost::new(values_from_json(VALID_FORM).unwrap());
    let mut orchestrator = Orchestrator::new(
        FieldRegistry::appointment_form().unwrap(),
        CompletionTimings::default(),
    );

    orchestrator.initialize(&mut host).unwrap();
    assert!(host.submit_enabled());
    assert_eq!(host.placeholder(fields::CURP), Some("Ej: ABCD010203HDFRRN09"));

    let sequence = match orchestrator.begin_submission(&mut host).unwrap() {
        SubmitAttempt::Accepted(seq) => seq,
        SubmitAttempt::Rejected(v) => panic!("unexpected rejection: {v:?}"),
    };
    assert_eq!(orchestrator.form_state(), FormState::Submitting);

    let task = tokio::spawn(async move {
        sequence.run(&mut host).await;
        host
    });

    // Let the task reach its first sleep, then peek at the midpoint.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!task.is_finished());

    let host = task.await.unwrap();
    assert!(host.submit_enabled());
    assert_eq!(host.submit_label(), SUBMIT_LABEL_IDLE);
    assert!(!host.success_visible());
    assert!(host.submitted().is_some());
    assert_ne!(SUBMIT_LABEL_BUSY, SUBMIT_LABEL_IDLE);
}

#[tokio::test]
async fn editing_fields_updates_errors_and_submit_state() {
    let mut host = ConsoleHost::new(BTreeMap::new());
    let mut orchestrator = Orchestrator::new(
        FieldRegistry::appointment_form().unwrap(),
        CompletionTimings::default(),
    );
    orchestrator.initialize(&mut host).unwrap();
    assert!(!host.submit_enabled());
    assert!(host.errors().is_empty());

    host.set_value(fields::CORREO, "ejemplo@@dominio.com");
    orchestrator.handle_input(&mut host, fields::CORREO).unwrap();
    assert_eq!(
        host.errors().get(fields::CORREO).map(String::as_str),
        Some("Correo electrónico inválido")
    );
    assert!(host.has_error_state(fields::CORREO));

    host.set_value(fields::CORREO, "ejemplo@dominio.com");
    orchestrator.handle_input(&mut host, fields::CORREO).unwrap();
    assert!(host.errors().is_empty());
    assert!(!host.has_error_state(fields::CORREO));
    assert!(!host.submit_enabled());
}

// ---------------------------------------------------------------------------
// Test: custom rule table
// ---------------------------------------------------------------------------

fn rule_file(name: &str, json: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("turno-{name}-{}.json", std::process::id()));
    std::fs::write(&path, json).unwrap();
    path
}

fn config_with_rules(path: &std::path::Path) -> HostConfig {
    HostConfig::from_lookup(|key| {
        (key == "TURNO_FORM_RULES").then(|| path.display().to_string())
    })
}

#[tokio::test(start_paused = true)]
async fn custom_rule_table_is_submitted() {
    let path = rule_file(
        "email-only",
        r#"[{"field": "correo", "required": true, "predicates": ["emailAdvanced"]}]"#,
    );
    let values = values_from_json(r#"{"correo": "ana@dominio.com"}"#).unwrap();

    let result = run_form(values, &config_with_rules(&path)).await;
    std::fs::remove_file(&path).ok();

    let request = match result.unwrap() {
        FormReport::Submitted(request) => request,
        FormReport::Incomplete(v) => panic!("form should be complete: {v:?}"),
    };
    assert_eq!(request.fields.len(), 1);
    assert_eq!(request.field(fields::CORREO), Some("ana@dominio.com"));
}

#[tokio::test(start_paused = true)]
async fn custom_rule_table_with_unknown_predicate_fails_to_start() {
    let path = rule_file(
        "unknown-predicate",
        r#"[{"field": "rfc", "required": true, "predicates": ["rfcCheck"]}]"#,
    );

    let result = run_form(BTreeMap::new(), &config_with_rules(&path)).await;
    std::fs::remove_file(&path).ok();

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("rfcCheck"));
}
