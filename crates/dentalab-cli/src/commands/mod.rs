pub mod laborzettel;
pub mod nav;
pub mod resource;
pub mod session;

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use dentalab_core::dates;
use dentalab_core::db::Database;
use dentalab_core::{App, AppError, ClientConfig, HttpTransport, Notification};

pub type CliApp = App<HttpTransport, Database>;

/// Build the client from the config file without touching the session.
pub fn open_app(client_config_path: &Path) -> Result<CliApp> {
    let config = ClientConfig::load(client_config_path)?;
    tracing::debug!(api = %config.api_base_url, "using backend");
    App::from_config(&config).map_err(fail)
}

/// Build the client and resume the stored session.
pub fn logged_in(client_config_path: &Path) -> Result<CliApp> {
    let mut app = open_app(client_config_path)?;
    if !app.restore().map_err(fail)? {
        anyhow::bail!("Not logged in. Run `dentalab login`.");
    }
    Ok(app)
}

/// Turn a core error into the message a user should see.
pub fn fail(error: AppError) -> anyhow::Error {
    let notification = Notification::from_error(&error);
    let mut message = notification.message;
    for (field, text) in &notification.fields {
        message.push_str(&format!("\n  {}: {}", field, text));
    }
    tracing::debug!(error = ?error, "command failed");
    anyhow::anyhow!(message)
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn confirm(label: &str) -> Result<bool> {
    Ok(prompt(label)?.eq_ignore_ascii_case("y"))
}

/// Print the age for a birth date, as of `on` or today.
pub fn age(birth_date: &str, on: Option<&str>) -> Result<()> {
    let birth = dates::parse_date(birth_date)
        .ok_or_else(|| anyhow::anyhow!("Invalid date: {}", birth_date))?;
    let today = match on {
        Some(on) => dates::parse_date(on).ok_or_else(|| anyhow::anyhow!("Invalid date: {}", on))?,
        None => chrono::Utc::now().date_naive(),
    };
    match dates::age_on(birth, today) {
        Some(years) => println!("{}", years),
        None => anyhow::bail!("Birth date {} lies after {}.", dates::format_date(birth), dates::format_date(today)),
    }
    Ok(())
}
