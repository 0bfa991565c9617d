//! Login / logout / whoami commands.

use std::path::Path;

use anyhow::Result;
use dentalab_core::Credentials;

use super::{fail, logged_in, open_app, print_json};
use crate::Output;

pub fn login(email: &str, password: &str, client_config_path: &Path) -> Result<()> {
    let mut app = open_app(client_config_path)?;
    let user = app
        .login(&Credentials::new(email, password))
        .map_err(fail)?;
    println!("Logged in as {} ({}).", user.name, user.role);
    Ok(())
}

pub fn logout(client_config_path: &Path) -> Result<()> {
    let mut app = open_app(client_config_path)?;
    // Restore first so the backend learns about the logout too.
    if let Err(e) = app.restore() {
        tracing::warn!(error = %e, "could not resume session before logout");
    }
    app.logout().map_err(fail)?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(output: Output, client_config_path: &Path) -> Result<()> {
    let app = logged_in(client_config_path)?;
    let session = app.session();
    let user = session
        .current_user()
        .ok_or_else(|| anyhow::anyhow!("Not logged in."))?;
    let permissions: Vec<&str> = session.permissions().iter().map(|p| p.as_str()).collect();

    match output {
        Output::Json => print_json(&serde_json::json!({
            "user": user,
            "permissions": permissions,
        }))?,
        Output::Table => {
            println!("{} <{}>", user.name, user.email);
            match user.role() {
                Some(role) => println!("Role:        {}", role.label()),
                None => println!("Role:        {} (unknown)", user.role),
            }
            if permissions.is_empty() {
                println!("Permissions: none");
            } else {
                println!("Permissions: {}", permissions.join(", "));
            }
        }
    }
    Ok(())
}
