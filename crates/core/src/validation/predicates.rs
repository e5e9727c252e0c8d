//! Named content predicates for form fields.
//!
//! Each predicate is a total, side-effect-free function of the field value.
//! Predicates are addressed by the name a rule table uses (`nameCheck`,
//! `curpCheck`, ...) and each carries a default message.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::curp;
use super::email;
use super::rules::ValidationOutcome;
use crate::error::CoreError;

/// Phone numbers carry between this many digits ...
pub const PHONE_MIN_DIGITS: usize = 7;
/// ... and this many.
pub const PHONE_MAX_DIGITS: usize = 10;
/// Mobile numbers carry exactly this many digits.
pub const MOBILE_DIGITS: usize = 10;

/// Run of one repeated character (spaces ignored) rejected as a name.
const NAME_REPEAT_RUN: usize = 4;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zÁÉÍÓÚáéíóúÑñüÜ\s'-]{2,}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Predicate names
// ---------------------------------------------------------------------------

/// Every predicate a field rule may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PredicateName {
    #[serde(rename = "nameCheck")]
    NameCheck,
    #[serde(rename = "curpCheck")]
    CurpCheck,
    #[serde(rename = "phoneCheck")]
    PhoneCheck,
    #[serde(rename = "celularCheck")]
    CelularCheck,
    #[serde(rename = "emailAdvanced")]
    EmailAdvanced,
}

impl PredicateName {
    pub const ALL: [PredicateName; 5] = [
        Self::NameCheck,
        Self::CurpCheck,
        Self::PhoneCheck,
        Self::CelularCheck,
        Self::EmailAdvanced,
    ];

    /// Parse a predicate name from a rule table.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Configuration(format!(
                    "Unknown predicate '{s}'. Must be one of: nameCheck, curpCheck, \
                     phoneCheck, celularCheck, emailAdvanced"
                ))
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameCheck => "nameCheck",
            Self::CurpCheck => "curpCheck",
            Self::PhoneCheck => "phoneCheck",
            Self::CelularCheck => "celularCheck",
            Self::EmailAdvanced => "emailAdvanced",
        }
    }

    /// Message shown when a field has no message of its own for this predicate.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::NameCheck => "Formato de nombre inválido",
            Self::CurpCheck => "CURP inválida",
            Self::PhoneCheck => "Teléfono inválido",
            Self::CelularCheck => "Celular inválido",
            Self::EmailAdvanced => "Correo inválido",
        }
    }

    /// Evaluate the predicate, keeping the diagnostic reason.
    pub fn evaluate(self, value: &str) -> ValidationOutcome {
        match self {
            Self::NameCheck => validate_name(value),
            Self::CurpCheck => curp::validate_curp(value),
            Self::PhoneCheck => validate_phone(value),
            Self::CelularCheck => validate_mobile(value),
            Self::EmailAdvanced => email::validate_email(value),
        }
    }

    /// Evaluate the predicate as a plain yes/no.
    pub fn check(self, value: &str) -> bool {
        self.evaluate(value).ok
    }

    /// Stored form of a value this predicate governs, when it differs from
    /// the trimmed input.
    pub fn normalize(self, value: &str) -> Option<String> {
        match self {
            Self::CurpCheck => Some(curp::normalize_curp(value)),
            Self::PhoneCheck | Self::CelularCheck => Some(digits_only(value)),
            Self::NameCheck | Self::EmailAdvanced => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

fn is_name_alphanumeric(c: char) -> bool {
    c.is_ascii_alphanumeric() || "ÁÉÍÓÚáéíóúÑñ".contains(c)
}

/// Person names: letters (Spanish accents, `ñ`, `ü`), single spaces,
/// hyphens and apostrophes.
pub fn validate_name(value: &str) -> ValidationOutcome {
    let v = value.trim();
    if v.is_empty() {
        return ValidationOutcome::invalid("nombre vacío");
    }
    if v.bytes().all(|b| b.is_ascii_digit()) {
        return ValidationOutcome::invalid("el nombre no puede ser solo números");
    }
    if !v.chars().any(is_name_alphanumeric) {
        return ValidationOutcome::invalid("el nombre no puede ser solo símbolos");
    }
    if v.contains("  ") {
        return ValidationOutcome::invalid("espacios consecutivos");
    }

    let mut compact = v.chars().filter(|c| !c.is_whitespace());
    if let Some(first) = compact.next() {
        let mut run = 1;
        let mut uniform = true;
        for c in compact {
            if c != first {
                uniform = false;
                break;
            }
            run += 1;
        }
        if uniform && run >= NAME_REPEAT_RUN {
            return ValidationOutcome::invalid("carácter repetido");
        }
    }

    if !NAME_RE.is_match(v) {
        return ValidationOutcome::invalid("caracteres no permitidos");
    }
    ValidationOutcome::valid()
}

pub fn name_check(value: &str) -> bool {
    validate_name(value).ok
}

// ---------------------------------------------------------------------------
// Phone numbers
// ---------------------------------------------------------------------------

/// Keep only the ASCII digits of a value (`55-1234 5678` → `5512345678`).
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Landline: 7 to 10 digits once separators are removed, not all zeros.
pub fn validate_phone(value: &str) -> ValidationOutcome {
    let digits = digits_only(value);
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len()) {
        return ValidationOutcome::invalid(format!(
            "se esperaban de {PHONE_MIN_DIGITS} a {PHONE_MAX_DIGITS} dígitos, hay {}",
            digits.len()
        ));
    }
    if digits.bytes().all(|b| b == b'0') {
        return ValidationOutcome::invalid("número con solo ceros");
    }
    ValidationOutcome::valid()
}

pub fn phone_check(value: &str) -> bool {
    validate_phone(value).ok
}

/// Mobile: exactly 10 digits once separators are removed, not one digit
/// repeated throughout.
pub fn validate_mobile(value: &str) -> ValidationOutcome {
    let digits = digits_only(value);
    if digits.len() != MOBILE_DIGITS {
        return ValidationOutcome::invalid(format!(
            "se esperaban {MOBILE_DIGITS} dígitos, hay {}",
            digits.len()
        ));
    }
    let first = digits.as_bytes()[0];
    if digits.bytes().all(|b| b == first) {
        return ValidationOutcome::invalid("dígito repetido");
    }
    ValidationOutcome::valid()
}

pub fn celular_check(value: &str) -> bool {
    validate_mobile(value).ok
}
