//! Layered email address validation.
//!
//! Each check returns its own reason so the form can tell the person what
//! to fix. Checks run in a fixed order and the first failure is reported.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::rules::ValidationOutcome;

/// Longest local part accepted, in characters.
pub const MAX_LOCAL_PART_LEN: usize = 64;

static TLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,24}$").expect("valid regex"));

static SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// First failing check of [`validate_email`], in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Correo vacío.")]
    Empty,
    #[error("El correo debe contener exactamente un @.")]
    AtSignCount,
    #[error("La parte antes de @ está vacía.")]
    EmptyLocalPart,
    #[error("La parte después de @ está vacía.")]
    EmptyDomain,
    #[error("La parte local no puede exceder 64 caracteres.")]
    LocalPartTooLong,
    #[error("La parte local no puede empezar/terminar con punto.")]
    LocalPartEdgeDot,
    #[error("La parte local no puede tener puntos consecutivos.")]
    LocalPartConsecutiveDots,
    #[error("La parte local debe contener al menos una letra.")]
    LocalPartWithoutLetter,
    #[error("El dominio no puede tener puntos consecutivos.")]
    DomainConsecutiveDots,
    #[error("El dominio debe contener al menos un punto (ej: dominio.com).")]
    DomainWithoutDot,
    #[error("TLD inválido (ej: com, mx).")]
    InvalidTld,
    #[error("Formato general inválido.")]
    Shape,
}

/// Letters that count for the "at least one letter" rule on the local part.
fn is_local_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || "ÁÉÍÓÚáéíóúÑñ".contains(c)
}

/// Run every check in order and stop at the first failure.
pub fn check_email(value: &str) -> Result<(), EmailError> {
    if value.is_empty() {
        return Err(EmailError::Empty);
    }

    let (local, domain) = match value.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => (local, domain),
        _ => return Err(EmailError::AtSignCount),
    };

    if local.is_empty() {
        return Err(EmailError::EmptyLocalPart);
    }
    if domain.is_empty() {
        return Err(EmailError::EmptyDomain);
    }

    if local.chars().count() > MAX_LOCAL_PART_LEN {
        return Err(EmailError::LocalPartTooLong);
    }
    if local.starts_with('.') || local.ends_with('.') {
        return Err(EmailError::LocalPartEdgeDot);
    }
    if local.contains("..") {
        return Err(EmailError::LocalPartConsecutiveDots);
    }
    if !local.chars().any(is_local_letter) {
        return Err(EmailError::LocalPartWithoutLetter);
    }

    if domain.contains("..") {
        return Err(EmailError::DomainConsecutiveDots);
    }
    let Some((_, tld)) = domain.rsplit_once('.') else {
        return Err(EmailError::DomainWithoutDot);
    };
    if !TLD_RE.is_match(tld) {
        return Err(EmailError::InvalidTld);
    }

    if !SHAPE_RE.is_match(value) {
        return Err(EmailError::Shape);
    }

    Ok(())
}

/// Email check with the reason for a rejection.
pub fn validate_email(value: &str) -> ValidationOutcome {
    match check_email(value) {
        Ok(()) => ValidationOutcome::valid(),
        Err(err) => ValidationOutcome::invalid(err.to_string()),
    }
}

/// Boolean form used by the `emailAdvanced` predicate.
pub fn email_advanced(value: &str) -> bool {
    check_email(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_address() {
        assert!(email_advanced("ejemplo@dominio.com"));
        assert!(email_advanced("nombre.apellido@sub.dominio.gob.mx"));
        assert!(email_advanced("josé@dominio.mx"));
    }

    #[test]
    fn rejects_in_order() {
        let cases = [
            ("", EmailError::Empty),
            ("ejemplo.dominio.com", EmailError::AtSignCount),
            ("ejemplo@@dominio.com", EmailError::AtSignCount),
            ("a@b@dominio.com", EmailError::AtSignCount),
            ("@dominio.com", EmailError::EmptyLocalPart),
            ("ejemplo@", EmailError::EmptyDomain),
            (".ejemplo@dominio.com", EmailError::LocalPartEdgeDot),
            ("ejemplo.@dominio.com", EmailError::LocalPartEdgeDot),
            ("a..b@dominio.com", EmailError::LocalPartConsecutiveDots),
            ("12345@dominio.com", EmailError::LocalPartWithoutLetter),
            ("_-+@dominio.com", EmailError::LocalPartWithoutLetter),
            ("ejemplo@dominio..com", EmailError::DomainConsecutiveDots),
            ("ejemplo@localhost", EmailError::DomainWithoutDot),
            ("ejemplo@dominio.c", EmailError::InvalidTld),
            ("ejemplo@dominio.c0m", EmailError::InvalidTld),
            ("ejemplo@dominio.", EmailError::InvalidTld),
            ("ej emplo@dominio.com", EmailError::Shape),
            ("ejemplo@.com", EmailError::Shape),
        ];
        for (input, expected) in cases {
            assert_eq!(check_email(input), Err(expected), "{input:?}");
        }
    }

    #[test]
    fn local_part_length_limit() {
        let at_limit = format!("{}@dominio.com", "a".repeat(MAX_LOCAL_PART_LEN));
        let over = format!("{}@dominio.com", "a".repeat(MAX_LOCAL_PART_LEN + 1));
        assert!(email_advanced(&at_limit));
        assert_eq!(check_email(&over), Err(EmailError::LocalPartTooLong));
    }

    #[test]
    fn tld_length_limits() {
        assert!(email_advanced(&format!("a@dominio.{}", "x".repeat(24))));
        assert_eq!(
            check_email(&format!("a@dominio.{}", "x".repeat(25))),
            Err(EmailError::InvalidTld)
        );
    }

    #[test]
    fn outcome_carries_reason() {
        let outcome = validate_email("ejemplo@@dominio.com");
        assert!(!outcome.ok);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("El correo debe contener exactamente un @.")
        );
        assert_eq!(validate_email("ejemplo@dominio.com"), ValidationOutcome::valid());
    }
}
