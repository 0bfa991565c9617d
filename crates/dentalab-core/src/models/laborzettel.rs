//! Laborzettel (lab worksheet) models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{self, FormErrors, Validate};

/// One billed position on a worksheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaborzettelItem {
    /// Fee-schedule position code (e.g. BEL II number)
    pub code: String,
    pub description: String,
    pub quantity: u32,
    /// Unit price in cents
    #[serde(default)]
    pub unit_price_cents: i64,
}

impl LaborzettelItem {
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// A lab worksheet summarizing procedures and quantities for one lab order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Laborzettel {
    pub id: i64,
    pub lab_request_id: i64,
    /// Worksheet number printed on the document
    pub number: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub clinic_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub technician_name: Option<String>,
    pub issued_on: NaiveDate,
    #[serde(default)]
    pub items: Vec<LaborzettelItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Laborzettel {
    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(LaborzettelItem::total_cents).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaborzettelForm {
    pub lab_request_id: i64,
    pub issued_on: NaiveDate,
    #[serde(default)]
    pub items: Vec<LaborzettelItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for LaborzettelForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.lab_request_id <= 0 {
            errors.add("lab_request_id", "is required");
        }
        if self.items.is_empty() {
            errors.add("items", "at least one position is required");
        }
        for (i, item) in self.items.iter().enumerate() {
            validation::required(&mut errors, &format!("items[{}].code", i), &item.code);
            if item.quantity == 0 {
                errors.add(&format!("items[{}].quantity", i), "must be greater than zero");
            }
            if item.unit_price_cents < 0 {
                errors.add(&format!("items[{}].unit_price_cents", i), "must not be negative");
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let zettel = Laborzettel {
            id: 1,
            lab_request_id: 5,
            number: "LZ-2024-0001".into(),
            patient_name: None,
            clinic_name: None,
            doctor_name: None,
            technician_name: None,
            issued_on: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            items: vec![
                LaborzettelItem {
                    code: "0010".into(),
                    description: "Modell".into(),
                    quantity: 2,
                    unit_price_cents: 1250,
                },
                LaborzettelItem {
                    code: "1022".into(),
                    description: "Vollkeramikkrone".into(),
                    quantity: 1,
                    unit_price_cents: 18900,
                },
            ],
            notes: None,
        };
        assert_eq!(zettel.total_cents(), 21400);
    }

    #[test]
    fn test_form_needs_positions() {
        let form = LaborzettelForm {
            lab_request_id: 5,
            issued_on: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            items: vec![],
            notes: None,
        };
        assert!(form.validate().is_err());
    }
}
