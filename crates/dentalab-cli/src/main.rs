//! `dentalab`: command-line client for the dental-lab backend.
//!
//! Logs in, browses role-filtered navigation, and reads or edits backend
//! resources through the same core the mobile apps use.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dentalab_core::ClientConfig;

/// Dental-lab CLI tool.
#[derive(Parser, Debug)]
#[command(name = "dentalab", about = "Dental-lab client", version)]
struct Cli {
    /// Path to client config file (default: ~/.dentalab/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format.
    #[arg(long = "output", short = 'o', global = true, value_enum, default_value_t = Output::Table)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Output {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session token.
    Login {
        /// Account email.
        #[arg(long)]
        email: Option<String>,
        /// Password (not recommended, use the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and forget the stored token.
    Logout,

    /// Show the logged-in user, role and permissions.
    Whoami,

    /// Show the navigation visible to the current user.
    Nav {
        /// Highlight the entry active for this path.
        #[arg(long)]
        path: Option<String>,
    },

    /// Check whether the current user holds every listed permission.
    Can {
        /// Permissions such as `patients.write`.
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Check whether the current user may open a page.
    Open {
        /// Page path, e.g. `/inventory/lots?material=5`.
        path: String,
    },

    /// List resources or fetch one by id.
    Get {
        /// Resource name (e.g. patients, lab-requests, lots).
        resource: String,
        /// Record id.
        id: Option<i64>,
        /// Free-text search.
        #[arg(long)]
        search: Option<String>,
        /// Sort field.
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending.
        #[arg(long)]
        desc: bool,
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size (default from config).
        #[arg(long = "per-page")]
        per_page: Option<u32>,
        /// Extra filter as key=value; repeatable.
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },

    /// Create a resource.
    Create {
        resource: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Update a resource.
    Update {
        resource: String,
        id: i64,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Delete a resource.
    Delete {
        resource: String,
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Export one or more Laborzettel.
    Export {
        /// Laborzettel ids.
        #[arg(required = true)]
        ids: Vec<i64>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,
        /// Plain-text template file with {{field}} placeholders.
        #[arg(long)]
        template: Option<String>,
    },

    /// Age in whole years for a birth date (YYYY-MM-DD or DD.MM.YYYY).
    Age {
        birth_date: String,
        /// Reference date (default: today).
        #[arg(long)]
        on: Option<String>,
    },

    /// Write a config file with the given backend URL.
    Init {
        /// Backend base URL.
        #[arg(long)]
        server: String,
    },
}

fn body_from(json_body: Option<String>, file: Option<String>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(&path)?)
    } else if let Some(json) = json_body {
        Ok(json)
    } else {
        anyhow::bail!("Provide --json or -f <file>.");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);
    let output = cli.output;

    match cli.command {
        Commands::Login { email, password } => {
            let email = match email {
                Some(email) => email,
                None => commands::prompt("Email: ")?,
            };
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::session::login(&email, &password, &config_path)?;
        }

        Commands::Logout => {
            commands::session::logout(&config_path)?;
        }

        Commands::Whoami => {
            commands::session::whoami(output, &config_path)?;
        }

        Commands::Nav { path } => {
            commands::nav::show(path.as_deref(), output, &config_path)?;
        }

        Commands::Can { permissions } => {
            commands::nav::can(&permissions, &config_path)?;
        }

        Commands::Open { path } => {
            commands::nav::open(&path, &config_path)?;
        }

        Commands::Get {
            resource,
            id,
            search,
            sort,
            desc,
            page,
            per_page,
            filters,
        } => {
            let params = commands::resource::ListParams {
                search,
                sort,
                desc,
                page,
                per_page,
                filters,
            };
            commands::resource::get(&resource, id, &params, output, &config_path)?;
        }

        Commands::Create {
            resource,
            json_body,
            file,
        } => {
            let body = body_from(json_body, file)?;
            commands::resource::create(&resource, &body, &config_path)?;
        }

        Commands::Update {
            resource,
            id,
            json_body,
            file,
        } => {
            let body = body_from(json_body, file)?;
            commands::resource::update(&resource, id, &body, &config_path)?;
        }

        Commands::Delete { resource, id, yes } => {
            if !yes && !commands::confirm("Are you sure? [y/N]: ")? {
                println!("Cancelled.");
                return Ok(());
            }
            commands::resource::delete(&resource, id, &config_path)?;
        }

        Commands::Export {
            ids,
            format,
            template,
        } => {
            let template = template.map(std::fs::read_to_string).transpose()?;
            commands::laborzettel::export(&ids, format, template.as_deref(), &config_path)?;
        }

        Commands::Age { birth_date, on } => {
            commands::age(&birth_date, on.as_deref())?;
        }

        Commands::Init { server } => {
            let mut config = ClientConfig::load(&config_path)?;
            config.api_base_url = server.trim().to_string();
            config.save(&config_path)?;
            println!("Config written to {}.", config_path.display());
        }
    }

    Ok(())
}
