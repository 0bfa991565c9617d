//! Worksheet export for printing and accounting.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{escape_csv, format_cents};
use crate::dates::format_date;
use crate::models::Laborzettel;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").expect("Failed to compile placeholder regex")
});

const CSV_HEADER: &str =
    "number,lab_request_id,issued_on,patient,clinic,doctor,code,description,quantity,unit_price,total\n";

/// Worksheet header fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborzettelHeader {
    pub number: String,
    pub lab_request_id: i64,
    /// Formatted as DD.MM.YYYY
    pub issued_on: String,
    pub patient_name: String,
    pub clinic_name: String,
    pub doctor_name: String,
    pub technician_name: String,
    pub notes: String,
}

/// One printed position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborzettelRow {
    pub position: usize,
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

/// Export of a single worksheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborzettelExport {
    pub header: LaborzettelHeader,
    pub rows: Vec<LaborzettelRow>,
    pub total_cents: i64,
    pub exported_at: String,
}

impl LaborzettelExport {
    pub fn from_laborzettel(zettel: &Laborzettel) -> Self {
        let rows: Vec<LaborzettelRow> = zettel
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| LaborzettelRow {
                position: i + 1,
                code: item.code.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                total_cents: item.total_cents(),
            })
            .collect();

        Self {
            header: LaborzettelHeader {
                number: zettel.number.clone(),
                lab_request_id: zettel.lab_request_id,
                issued_on: format_date(zettel.issued_on),
                patient_name: zettel.patient_name.clone().unwrap_or_default(),
                clinic_name: zettel.clinic_name.clone().unwrap_or_default(),
                doctor_name: zettel.doctor_name.clone().unwrap_or_default(),
                technician_name: zettel.technician_name.clone().unwrap_or_default(),
                notes: zettel.notes.clone().unwrap_or_default(),
            },
            total_cents: zettel.total_cents(),
            rows,
            exported_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        self.write_csv_rows(&mut csv);
        csv
    }

    fn write_csv_rows(&self, csv: &mut String) {
        let h = &self.header;
        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&h.number),
                h.lab_request_id,
                h.issued_on,
                escape_csv(&h.patient_name),
                escape_csv(&h.clinic_name),
                escape_csv(&h.doctor_name),
                escape_csv(&row.code),
                escape_csv(&row.description),
                row.quantity,
                format_cents(row.unit_price_cents),
                format_cents(row.total_cents),
            ));
        }
    }

    /// Values available to [`render`](Self::render).
    pub fn fields(&self) -> BTreeMap<&'static str, String> {
        let h = &self.header;
        let positions: Vec<String> = self
            .rows
            .iter()
            .map(|r| {
                format!(
                    "{:>2}. {} {} x{} {}",
                    r.position,
                    r.code,
                    r.description,
                    r.quantity,
                    format_cents(r.total_cents)
                )
            })
            .collect();

        BTreeMap::from([
            ("number", h.number.clone()),
            ("lab_request_id", h.lab_request_id.to_string()),
            ("issued_on", h.issued_on.clone()),
            ("patient", h.patient_name.clone()),
            ("clinic", h.clinic_name.clone()),
            ("doctor", h.doctor_name.clone()),
            ("technician", h.technician_name.clone()),
            ("notes", h.notes.clone()),
            ("positions", positions.join("\n")),
            ("total", format_cents(self.total_cents)),
        ])
    }

    /// Substitute `{{ field }}` placeholders. Unknown placeholders are left
    /// as they are.
    pub fn render(&self, template: &str) -> String {
        let fields = self.fields();
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures| {
                fields
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Default plain-text worksheet layout.
pub const DEFAULT_TEMPLATE: &str = "\
Laborzettel {{number}}  ({{issued_on}})
Clinic:  {{clinic}}
Doctor:  {{doctor}}
Patient: {{patient}}

{{positions}}

Total: {{total}} EUR
{{notes}}
";

/// Export of several worksheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchLaborzettelExport {
    pub exported_at: String,
    pub worksheets: Vec<LaborzettelExport>,
    pub total_rows: usize,
    pub total_cents: i64,
}

impl BatchLaborzettelExport {
    pub fn from_laborzettel<'a>(zettel: impl IntoIterator<Item = &'a Laborzettel>) -> Self {
        let worksheets: Vec<LaborzettelExport> = zettel
            .into_iter()
            .map(LaborzettelExport::from_laborzettel)
            .collect();
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            total_rows: worksheets.iter().map(|w| w.rows.len()).sum(),
            total_cents: worksheets.iter().map(|w| w.total_cents).sum(),
            worksheets,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        for worksheet in &self.worksheets {
            worksheet.write_csv_rows(&mut csv);
        }
        csv
    }
}
