//! CURP (Clave Única de Registro de Población) decoding.
//!
//! Layout, 18 characters, all positions fixed:
//!
//! | Pos   | Len | Content                                   |
//! |-------|-----|-------------------------------------------|
//! | 0..4  | 4   | letters, name and surname initials        |
//! | 4..10 | 6   | birth date `YYMMDD`                       |
//! | 10    | 1   | sex, `H` or `M`                           |
//! | 11..13| 2   | state of birth, see [`STATE_CODES`]       |
//! | 13..16| 3   | letters, inner consonants of the names    |
//! | 16    | 1   | letter or digit assigned by the registry  |
//! | 17    | 1   | check digit (presence only, not verified) |

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;

use super::rules::ValidationOutcome;

/// State-of-birth codes accepted in positions 11..13. `NE` (born abroad)
/// is listed as issued, alongside the 32 federal entities.
pub const STATE_CODES: [&str; 33] = [
    "AS", "BC", "BS", "CC", "CL", "CM", "CS", "CH", "DF", "DG", "GT", "GR", "HG", "JC", "MC",
    "MN", "MS", "NT", "NL", "OC", "PL", "QT", "QR", "SP", "SL", "SR", "TC", "TS", "TL", "VZ",
    "YN", "ZS", "NE",
];

/// Two-digit years up to and including this value belong to the 2000s.
pub const YEAR_PIVOT: u32 = 29;

static CURP_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^([A-Z]{{4}})([0-9]{{2}})([0-9]{{2}})([0-9]{{2}})([HM])({})([A-Z]{{3}})([A-Z0-9])([0-9])$",
        STATE_CODES.join("|")
    );
    Regex::new(&pattern).expect("valid regex")
});

/// Why a CURP was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CurpError {
    #[error("Formato CURP inválido (estructura incorrecta).")]
    Structure,

    #[error("Fecha inválida en la CURP (YYMMDD incorrecto).")]
    InvalidDate,

    #[error("Sexo inválido en CURP (debe ser H o M).")]
    InvalidSex,
}

/// Sex marker at position 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// `H` (hombre).
    Male,
    /// `M` (mujer).
    Female,
}

impl Sex {
    fn from_marker(marker: &str) -> Result<Self, CurpError> {
        match marker {
            "H" => Ok(Self::Male),
            "M" => Ok(Self::Female),
            _ => Err(CurpError::InvalidSex),
        }
    }
}

/// A structurally valid CURP split into its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurpRecord {
    /// Normalized code: uppercase, no whitespace.
    pub code: String,
    pub initials: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub state_code: String,
    pub consonants: String,
    pub homoclave: char,
    pub check_digit: u8,
}

/// Uppercase and drop every whitespace character.
pub fn normalize_curp(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Expand a two-digit year with the [`YEAR_PIVOT`] rule.
pub fn resolve_year(yy: u32) -> i32 {
    if yy <= YEAR_PIVOT {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

/// Build the birth date from the `YY`, `MM` and `DD` groups.
///
/// The date must read back to exactly the same year, month and day; days
/// past the end of the month (April 31, February 30, February 29 outside
/// leap years) and zero months or days are rejected.
pub fn decode_birth_date(yy: u32, mm: u32, dd: u32) -> Result<NaiveDate, CurpError> {
    let year = resolve_year(yy);
    NaiveDate::from_ymd_opt(year, mm, dd)
        .filter(|d| d.year() == year && d.month() == mm && d.day() == dd)
        .ok_or(CurpError::InvalidDate)
}

/// Date-of-birth check over a `YYMMDD` string.
pub fn check_birth_date(yymmdd: &str) -> ValidationOutcome {
    if yymmdd.len() != 6 || !yymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return ValidationOutcome::invalid("invalid date");
    }
    let group = |i: usize| yymmdd[i..i + 2].parse::<u32>().unwrap_or(0);
    match decode_birth_date(group(0), group(2), group(4)) {
        Ok(_) => ValidationOutcome::valid(),
        Err(_) => ValidationOutcome::invalid("invalid date"),
    }
}

/// Decode a CURP in any case, with or without embedded whitespace.
pub fn decode_curp(raw: &str) -> Result<CurpRecord, CurpError> {
    let code = normalize_curp(raw);
    let caps = CURP_RE.captures(&code).ok_or(CurpError::Structure)?;

    // The pattern guarantees two ASCII digits in each date group.
    let number = |i: usize| caps[i].parse::<u32>().map_err(|_| CurpError::Structure);
    let birth_date = decode_birth_date(number(2)?, number(3)?, number(4)?)?;
    let sex = Sex::from_marker(&caps[5])?;

    let homoclave = caps[8].chars().next().ok_or(CurpError::Structure)?;
    let check_digit = caps[9]
        .bytes()
        .next()
        .map(|b| b - b'0')
        .ok_or(CurpError::Structure)?;

    Ok(CurpRecord {
        initials: caps[1].to_string(),
        birth_date,
        sex,
        state_code: caps[6].to_string(),
        consonants: caps[7].to_string(),
        homoclave,
        check_digit,
        code,
    })
}

/// CURP check with the reason for a rejection.
pub fn validate_curp(raw: &str) -> ValidationOutcome {
    match decode_curp(raw) {
        Ok(_) => ValidationOutcome::valid(),
        Err(err) => ValidationOutcome::invalid(err.to_string()),
    }
}

/// Boolean form used by the `curpCheck` predicate.
pub fn curp_check(raw: &str) -> bool {
    decode_curp(raw).is_ok()
}
