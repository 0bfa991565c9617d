//! Laborzettel export command.

use std::path::Path;

use anyhow::Result;
use dentalab_core::export::{BatchLaborzettelExport, LaborzettelExport, DEFAULT_TEMPLATE};

use super::{fail, logged_in};
use crate::ExportFormat;

pub fn export(
    ids: &[i64],
    format: ExportFormat,
    template: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    let mut app = logged_in(client_config_path)?;
    let mut worksheets = Vec::with_capacity(ids.len());
    for id in ids {
        worksheets.push(app.laborzettel().get(*id).map_err(fail)?);
    }
    tracing::info!(count = worksheets.len(), ?format, "exporting laborzettel");

    let out = match (format, worksheets.as_slice()) {
        (ExportFormat::Json, [single]) => LaborzettelExport::from_laborzettel(single).to_json()?,
        (ExportFormat::Json, _) => BatchLaborzettelExport::from_laborzettel(&worksheets).to_json()?,
        (ExportFormat::Csv, _) => BatchLaborzettelExport::from_laborzettel(&worksheets).to_csv(),
        (ExportFormat::Text, _) => {
            let template = template.unwrap_or(DEFAULT_TEMPLATE);
            worksheets
                .iter()
                .map(|z| LaborzettelExport::from_laborzettel(z).render(template))
                .collect::<Vec<_>>()
                .join("\n\x0c\n")
        }
    };
    print!("{}", out);
    if !out.ends_with('\n') {
        println!();
    }
    Ok(())
}
