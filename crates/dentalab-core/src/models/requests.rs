//! Treatment requests (clinic side) and lab requests (lab side).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{self, FormErrors, Validate};

/// Workflow status of a treatment request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// A clinic-side treatment order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentRequest {
    pub id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    /// Operation (procedure) being requested
    #[serde(default)]
    pub operation_id: Option<i64>,
    /// FDI tooth numbers
    #[serde(default)]
    pub teeth: Vec<u8>,
    /// Tooth shade, e.g. "A2"
    #[serde(default)]
    pub shade: Option<String>,
    #[serde(default)]
    pub status: TreatmentStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreatmentRequestForm {
    pub patient_id: i64,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default)]
    pub operation_id: Option<i64>,
    #[serde(default)]
    pub teeth: Vec<u8>,
    #[serde(default)]
    pub shade: Option<String>,
    #[serde(default)]
    pub status: TreatmentStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for TreatmentRequestForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.patient_id <= 0 {
            errors.add("patient_id", "is required");
        }
        validation::tooth_numbers(&mut errors, "teeth", &self.teeth);
        errors.into_result()
    }
}

/// Workflow status of a lab request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LabRequestStatus {
    #[default]
    Received,
    InProgress,
    QualityCheck,
    Shipped,
    Delivered,
    Cancelled,
}

impl LabRequestStatus {
    /// Whether the lab still has work to do on the request.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            LabRequestStatus::Received | LabRequestStatus::InProgress | LabRequestStatus::QualityCheck
        )
    }
}

/// A single procedure line on a lab request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabRequestItem {
    pub operation_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub material_id: Option<i64>,
    #[serde(default)]
    pub teeth: Vec<u8>,
}

/// A lab-side job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabRequest {
    pub id: i64,
    #[serde(default)]
    pub treatment_request_id: Option<i64>,
    pub patient_id: i64,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default)]
    pub technician_id: Option<i64>,
    #[serde(default)]
    pub status: LabRequestStatus,
    #[serde(default)]
    pub items: Vec<LabRequestItem>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl LabRequest {
    /// Open and past its due date on `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status.is_open() && self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LabRequestForm {
    #[serde(default)]
    pub treatment_request_id: Option<i64>,
    pub patient_id: i64,
    #[serde(default)]
    pub clinic_id: Option<i64>,
    #[serde(default)]
    pub technician_id: Option<i64>,
    #[serde(default)]
    pub status: LabRequestStatus,
    #[serde(default)]
    pub items: Vec<LabRequestItem>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for LabRequestForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.patient_id <= 0 {
            errors.add("patient_id", "is required");
        }
        if self.items.is_empty() {
            errors.add("items", "at least one item is required");
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                errors.add(&format!("items[{}].quantity", i), "must be greater than zero");
            }
            validation::tooth_numbers(&mut errors, &format!("items[{}].teeth", i), &item.teeth);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32) -> LabRequestItem {
        LabRequestItem {
            operation_id: 1,
            quantity,
            material_id: None,
            teeth: vec![16],
        }
    }

    #[test]
    fn test_lab_request_form_needs_items() {
        let form = LabRequestForm {
            patient_id: 4,
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("items"), Some("at least one item is required"));
    }

    #[test]
    fn test_lab_request_form_item_quantity() {
        let form = LabRequestForm {
            patient_id: 4,
            items: vec![item(1), item(0)],
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("items[1].quantity").is_some());
        assert!(errors.get("items[0].quantity").is_none());
    }

    #[test]
    fn test_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut request: LabRequest = serde_json::from_value(serde_json::json!({
            "id": 1,
            "patient_id": 2,
            "status": "in_progress",
            "due_date": "2024-03-09"
        }))
        .unwrap();
        assert!(request.is_overdue(today));

        request.status = LabRequestStatus::Shipped;
        assert!(!request.is_overdue(today));
    }

    #[test]
    fn test_treatment_form_teeth() {
        let form = TreatmentRequestForm {
            patient_id: 1,
            teeth: vec![11, 99],
            ..Default::default()
        };
        assert!(form.validate().is_err());
    }
}
