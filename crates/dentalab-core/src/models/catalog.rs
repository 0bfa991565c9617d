//! Reference data: select options, operations (procedures) and categories.

use serde::{Deserialize, Serialize};

use crate::validation::{self, FormErrors, Validate};

fn default_true() -> bool {
    true
}

/// A configurable dropdown entry (shades, genders, insurance types...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectOption {
    pub id: i64,
    /// Which dropdown the option belongs to
    pub group: String,
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectOptionForm {
    pub group: String,
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Validate for SelectOptionForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "group", &self.group);
        validation::required(&mut errors, "label", &self.label);
        validation::required(&mut errors, "value", &self.value);
        errors.into_result()
    }
}

/// Active options of one group, sorted for display.
pub fn options_for_group<'a>(options: &'a [SelectOption], group: &str) -> Vec<&'a SelectOption> {
    let mut out: Vec<&SelectOption> = options
        .iter()
        .filter(|o| o.active && o.group == group)
        .collect();
    out.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.label.cmp(&b.label)));
    out
}

/// A billable procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub price_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OperationForm {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub price_cents: i64,
}

impl Validate for OperationForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "code", &self.code);
        validation::required(&mut errors, "name", &self.name);
        if self.price_cents < 0 {
            errors.add("price_cents", "must not be negative");
        }
        errors.into_result()
    }
}

/// Grouping for operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CategoryForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        validation::required(&mut errors, "name", &self.name);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: i64, group: &str, label: &str, sort_order: i32, active: bool) -> SelectOption {
        SelectOption {
            id,
            group: group.into(),
            label: label.into(),
            value: label.to_lowercase(),
            sort_order,
            active,
        }
    }

    #[test]
    fn test_options_for_group() {
        let options = vec![
            option(1, "shade", "A3", 2, true),
            option(2, "shade", "A1", 1, true),
            option(3, "gender", "Female", 0, true),
            option(4, "shade", "B1", 0, false),
        ];
        let shades: Vec<&str> = options_for_group(&options, "shade")
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(shades, vec!["A1", "A3"]);
    }
}
