//! Clinics and their staff (doctors, nurses, lab technicians).

use serde::{Deserialize, Serialize};

use crate::validation::{self, FormErrors, Validate};

fn default_true() -> bool {
    true
}

/// A dental clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clinic {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClinicForm {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Validate for ClinicForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "name", &self.name);
        validation::optional_email(&mut errors, "email", self.email.as_deref());
        validation::optional_phone(&mut errors, "phone", self.phone.as_deref());
        if let Some(code) = self.postal_code.as_deref().filter(|c| !c.is_empty()) {
            if !code.chars().all(|c| c.is_ascii_digit()) || !(4..=5).contains(&code.len()) {
                errors.add("postal_code", "must be 4 or 5 digits");
            }
        }
        errors.into_result()
    }
}

/// A doctor, nurse or lab technician. All three share one record shape and
/// differ only in the collection they live in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffMember {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    /// Linked login account, if any
    #[serde(default)]
    pub user_id: Option<i64>,
    /// e.g. "Prothetik", "Kieferorthopädie"
    #[serde(default)]
    pub specialization: Option<String>,
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StaffForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl Validate for StaffForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "first_name", &self.first_name);
        validation::required(&mut errors, "last_name", &self.last_name);
        validation::optional_email(&mut errors, "email", self.email.as_deref());
        validation::optional_phone(&mut errors, "phone", self.phone.as_deref());
        errors.into_result()
    }
}
