//! Form validation.
//!
//! Every writable resource has a form payload that is checked before it is
//! submitted. Errors are collected per field so a UI can show them inline;
//! an invalid form is never sent to the backend.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ()/\-]{4,19}$").expect("Failed to compile phone regex")
});

/// Per-field validation errors for one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field. The first error reported for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Error message for a single field, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Iterate `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `Ok(())` when no errors were recorded.
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// A form payload that can be checked before submission.
pub trait Validate {
    fn validate(&self) -> Result<(), FormErrors>;
}

/// Non-blank text.
pub fn required(errors: &mut FormErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "is required");
    }
}

/// A required, well-formed email address.
pub fn email(errors: &mut FormErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "is required");
    } else if !EMAIL_REGEX.is_match(value.trim()) {
        errors.add(field, "is not a valid email address");
    }
}

/// An email address that may be left empty.
pub fn optional_email(errors: &mut FormErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        email(errors, field, v);
    }
}

/// A phone number that may be left empty.
pub fn optional_phone(errors: &mut FormErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        if !PHONE_REGEX.is_match(v.trim()) {
            errors.add(field, "is not a valid phone number");
        }
    }
}

pub fn positive(errors: &mut FormErrors, field: &str, value: f64) {
    if !(value > 0.0) || !value.is_finite() {
        errors.add(field, "must be greater than zero");
    }
}

pub fn not_negative(errors: &mut FormErrors, field: &str, value: f64) {
    if value < 0.0 || !value.is_finite() {
        errors.add(field, "must not be negative");
    }
}

/// Dates such as birth dates must not lie after `today`.
pub fn not_in_future(errors: &mut FormErrors, field: &str, value: Option<NaiveDate>, today: NaiveDate) {
    if let Some(date) = value {
        if date > today {
            errors.add(field, "must not be in the future");
        }
    }
}

/// FDI two-digit tooth notation.
///
/// Quadrants 1-4 hold permanent teeth 1-8, quadrants 5-8 hold primary
/// teeth 1-5.
pub fn is_valid_fdi_tooth(number: u8) -> bool {
    let quadrant = number / 10;
    let tooth = number % 10;
    match quadrant {
        1..=4 => (1..=8).contains(&tooth),
        5..=8 => (1..=5).contains(&tooth),
        _ => false,
    }
}

/// Every entry must be a valid FDI tooth number, without duplicates.
pub fn tooth_numbers(errors: &mut FormErrors, field: &str, teeth: &[u8]) {
    if let Some(bad) = teeth.iter().find(|t| !is_valid_fdi_tooth(**t)) {
        errors.add(field, format!("{} is not a valid FDI tooth number", bad));
        return;
    }
    let mut seen = std::collections::BTreeSet::new();
    if let Some(dup) = teeth.iter().find(|t| !seen.insert(**t)) {
        errors.add(field, format!("tooth {} is listed twice", dup));
    }
}

/// Today's date in UTC, used as the reference for date checks.
pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_blank() {
        let mut errors = FormErrors::new();
        required(&mut errors, "name", "   ");
        assert_eq!(errors.get("name"), Some("is required"));
    }

    #[test]
    fn test_email() {
        let mut errors = FormErrors::new();
        email(&mut errors, "email", "dr.weber@praxis.de");
        assert!(errors.is_empty());

        email(&mut errors, "email", "not-an-email");
        assert_eq!(errors.get("email"), Some("is not a valid email address"));
    }

    #[test]
    fn test_optional_fields_accept_empty() {
        let mut errors = FormErrors::new();
        optional_email(&mut errors, "email", None);
        optional_email(&mut errors, "email", Some(""));
        optional_phone(&mut errors, "phone", Some(" "));
        assert!(errors.is_empty());

        optional_phone(&mut errors, "phone", Some("+49 30 1234567"));
        assert!(errors.is_empty());
        optional_phone(&mut errors, "phone", Some("call me"));
        assert!(errors.get("phone").is_some());
    }

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = FormErrors::new();
        errors.add("name", "is required");
        errors.add("name", "is too long");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some("is required"));
    }

    #[test]
    fn test_fdi_numbers() {
        assert!(is_valid_fdi_tooth(11));
        assert!(is_valid_fdi_tooth(48));
        assert!(is_valid_fdi_tooth(55));
        assert!(!is_valid_fdi_tooth(56));
        assert!(!is_valid_fdi_tooth(19));
        assert!(!is_valid_fdi_tooth(90));
        assert!(!is_valid_fdi_tooth(10));
    }

    #[test]
    fn test_tooth_numbers_duplicates() {
        let mut errors = FormErrors::new();
        tooth_numbers(&mut errors, "teeth", &[11, 21, 11]);
        assert_eq!(errors.get("teeth"), Some("tooth 11 is listed twice"));
    }

    #[test]
    fn test_not_in_future() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut errors = FormErrors::new();
        not_in_future(&mut errors, "birth_date", NaiveDate::from_ymd_opt(2024, 5, 1), today);
        assert!(errors.is_empty());
        not_in_future(&mut errors, "birth_date", NaiveDate::from_ymd_opt(2024, 5, 2), today);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_display_lists_fields() {
        let mut errors = FormErrors::new();
        errors.add("last_name", "is required");
        errors.add("email", "is not a valid email address");
        assert_eq!(
            errors.to_string(),
            "email: is not a valid email address; last_name: is required"
        );
        assert!(errors.into_result().is_err());
    }
}
