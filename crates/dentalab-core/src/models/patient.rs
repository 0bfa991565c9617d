//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::validation::{self, FormErrors, Validate};

/// A patient record, owned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Health insurance number
    #[serde(default)]
    pub insurance_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Clinic the patient belongs to
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Patient {
    /// "Last, First" as shown in lists.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|b| dates::age_on(b, today))
    }

    /// Age in whole years as of today (UTC).
    pub fn age(&self) -> Option<u32> {
        self.birth_date.and_then(dates::age_from_birthdate)
    }
}

/// Create/edit payload for a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub insurance_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PatientForm {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }
}

impl From<&Patient> for PatientForm {
    fn from(p: &Patient) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            birth_date: p.birth_date,
            gender: p.gender.clone(),
            insurance_number: p.insurance_number.clone(),
            phone: p.phone.clone(),
            email: p.email.clone(),
            address: p.address.clone(),
            clinic_id: p.clinic_id,
            notes: p.notes.clone(),
        }
    }
}

impl Validate for PatientForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "first_name", &self.first_name);
        validation::required(&mut errors, "last_name", &self.last_name);
        validation::not_in_future(&mut errors, "birth_date", self.birth_date, validation::today());
        validation::optional_email(&mut errors, "email", self.email.as_deref());
        validation::optional_phone(&mut errors, "phone", self.phone.as_deref());
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        serde_json::from_value(serde_json::json!({
            "id": 12,
            "first_name": "Max",
            "last_name": "Mustermann",
            "birth_date": "1980-06-15"
        }))
        .unwrap()
    }

    #[test]
    fn test_display_name() {
        assert_eq!(patient().display_name(), "Mustermann, Max");
    }

    #[test]
    fn test_age_on() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert_eq!(patient().age_on(today), Some(43));
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(patient().age_on(today), Some(44));
    }

    #[test]
    fn test_form_requires_names() {
        let form = PatientForm::new("", "Mustermann");
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("first_name"), Some("is required"));
        assert!(errors.get("last_name").is_none());
    }

    #[test]
    fn test_form_rejects_future_birth_date() {
        let mut form = PatientForm::new("Max", "Mustermann");
        form.birth_date = NaiveDate::from_ymd_opt(2999, 1, 1);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_form_from_patient() {
        let form = PatientForm::from(&patient());
        assert!(form.validate().is_ok());
        assert_eq!(form.last_name, "Mustermann");
    }
}
