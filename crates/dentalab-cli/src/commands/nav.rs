//! Navigation and access-check commands.

use std::path::Path;

use anyhow::Result;
use dentalab_core::{Guard, Permission};

use super::{fail, logged_in, print_json};
use crate::Output;

/// Print the navigation visible to the current user.
pub fn show(path: Option<&str>, output: Output, client_config_path: &Path) -> Result<()> {
    let app = logged_in(client_config_path)?;
    let nav = app.navigation();
    let active = path.and_then(|p| nav.active(p));

    if output == Output::Json {
        return print_json(&serde_json::json!({
            "primary": nav.primary,
            "overflow": nav.overflow,
            "active": active.map(|item| item.label),
        }));
    }

    let is_active = |label: &str| active.is_some_and(|a| a.label == label);
    for item in &nav.primary {
        let marker = if is_active(item.label) { "*" } else { " " };
        println!("{} {:<20} {}", marker, item.label, item.route);
    }
    if !nav.overflow.is_empty() {
        println!("  more:");
        for item in &nav.overflow {
            let marker = if is_active(item.label) { "*" } else { " " };
            println!("{}   {:<18} {}", marker, item.label, item.route);
        }
    }
    Ok(())
}

pub fn can(permissions: &[String], client_config_path: &Path) -> Result<()> {
    let required = permissions
        .iter()
        .map(|p| p.parse::<Permission>())
        .collect::<Result<Vec<_>, _>>()?;
    let app = logged_in(client_config_path)?;
    if app.session().can(&required) {
        println!("yes");
        Ok(())
    } else {
        anyhow::bail!("no");
    }
}

/// Run the route guard for `path`.
pub fn open(path: &str, client_config_path: &Path) -> Result<()> {
    let mut app = logged_in(client_config_path)?;
    match app.navigate(path).map_err(fail)? {
        Guard::Allow => {
            let page = app
                .current_page()
                .map(|p| format!("{:?}", p))
                .unwrap_or_default();
            println!("allowed: {}", page);
            if let Some(item) = app.active_nav_item() {
                println!("menu: {}", item.label);
            }
            Ok(())
        }
        Guard::RedirectToLogin => anyhow::bail!("Not logged in. Run `dentalab login`."),
        Guard::Forbidden => anyhow::bail!("Access denied: {}", path),
    }
}
