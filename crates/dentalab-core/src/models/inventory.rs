//! Inventory: materials, lots and stock movements.
//!
//! Stock levels are computed by the backend; the client only displays them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::{self, FormErrors, Validate};

/// A consumable material (zirconia blanks, alloys, impression material...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryMaterial {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Stock unit, e.g. "g", "pcs", "ml"
    pub unit: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Reorder threshold
    #[serde(default)]
    pub min_stock: f64,
    /// Server-computed current stock
    #[serde(default)]
    pub current_stock: f64,
}

impl InventoryMaterial {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MaterialForm {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub unit: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_stock: f64,
}

impl Validate for MaterialForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "name", &self.name);
        validation::required(&mut errors, "unit", &self.unit);
        validation::not_negative(&mut errors, "min_stock", self.min_stock);
        errors.into_result()
    }
}

/// A received lot of one material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryLot {
    pub id: i64,
    pub material_id: i64,
    pub lot_number: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub quantity: f64,
    #[serde(default)]
    pub received_at: Option<NaiveDate>,
}

impl InventoryLot {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|d| d < today)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LotForm {
    pub material_id: i64,
    pub lot_number: String,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub quantity: f64,
    #[serde(default)]
    pub received_at: Option<NaiveDate>,
}

impl Validate for LotForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.material_id <= 0 {
            errors.add("material_id", "is required");
        }
        validation::required(&mut errors, "lot_number", &self.lot_number);
        validation::positive(&mut errors, "quantity", self.quantity);
        if let (Some(received), Some(expiry)) = (self.received_at, self.expiry_date) {
            if expiry < received {
                errors.add("expiry_date", "must not be before the receiving date");
            }
        }
        errors.into_result()
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    In,
    Out,
    Adjustment,
}

/// A stock movement against a material (and optionally a lot).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryMovement {
    pub id: i64,
    pub material_id: i64,
    #[serde(default)]
    pub lot_id: Option<i64>,
    pub kind: MovementKind,
    pub quantity: f64,
    #[serde(default)]
    pub reason: Option<String>,
    /// Lab request the material was consumed for
    #[serde(default)]
    pub lab_request_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl InventoryMovement {
    /// Quantity with the sign of its effect on stock. Adjustments carry their
    /// own sign.
    pub fn signed_quantity(&self) -> f64 {
        match self.kind {
            MovementKind::In => self.quantity.abs(),
            MovementKind::Out => -self.quantity.abs(),
            MovementKind::Adjustment => self.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementForm {
    pub material_id: i64,
    #[serde(default)]
    pub lot_id: Option<i64>,
    pub kind: MovementKind,
    pub quantity: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub lab_request_id: Option<i64>,
}

impl Validate for MovementForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.material_id <= 0 {
            errors.add("material_id", "is required");
        }
        match self.kind {
            MovementKind::Adjustment => {
                if self.quantity == 0.0 || !self.quantity.is_finite() {
                    errors.add("quantity", "must not be zero");
                }
                if self.reason.as_deref().map_or(true, |r| r.trim().is_empty()) {
                    errors.add("reason", "is required for adjustments");
                }
            }
            _ => validation::positive(&mut errors, "quantity", self.quantity),
        }
        errors.into_result()
    }
}
