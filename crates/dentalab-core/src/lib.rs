//! Dentalab Core Library
//!
//! Client core for a dental-lab/clinic management system backed by a REST
//! API with bearer-token authentication.
//!
//! # Architecture
//!
//! ```text
//!   navigate(path) ──► routes::authorize ──► Allow / RedirectToLogin / Forbidden
//!                                │
//!                                ▼
//!   endpoint call ──► QueryCache hit? ──yes──► cached JSON
//!                                │no
//!                                ▼
//!                     ApiClient<Transport> ──► REST backend
//!                                │
//!                 401 ──► Session::force_logout ──► route = /login
//!                 2xx mutation ──► invalidate resource + dependents
//! ```
//!
//! # Modules
//!
//! - [`access`]: static role → permission table and lookups
//! - [`navigation`]: role-filtered navigation with active-item detection
//! - [`session`]: login/logout/restore state machine, token persistence
//! - [`routes`]: URL → page resolution and route guard
//! - [`api`]: transport, status mapping, list queries, resource table
//! - [`cache`]: query cache with stale time and invalidation
//! - [`resources`]: typed endpoints on [`App`]
//! - [`validation`], [`dates`], [`export`], [`notify`]: form checks, age
//!   computation, Laborzettel export, user-facing messages
//! - [`db`]: SQLite local storage
//! - [`config`]: `~/.dentalab/config.toml`

pub mod access;
pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod dates;
pub mod db;
pub mod export;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod resources;
pub mod routes;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, FakeBackend, HttpTransport, ListQuery, Paginated, Resource};
pub use app::{App, AppError, AppResult};
pub use config::ClientConfig;
pub use db::Database;
pub use models::{Credentials, Permission, Role, User};
pub use navigation::{NavItem, Navigation};
pub use notify::Notification;
pub use routes::{Guard, Page};
pub use session::{MemoryTokenStore, Session, SessionState, TokenStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use export::{BatchLaborzettelExport, LaborzettelExport};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DentalabError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Failed(String),
}

impl From<AppError> for DentalabError {
    fn from(e: AppError) -> Self {
        // The message the UI shows, with the fallback applied.
        let message = Notification::from_error(&e).message;
        match &e {
            _ if e.is_unauthorized() => DentalabError::Unauthorized(message),
            AppError::Validation(_) => DentalabError::Validation(e.to_string()),
            AppError::Api(ApiError::Validation { .. }) => DentalabError::Validation(message),
            AppError::Api(ApiError::Forbidden(_)) | AppError::ReadOnly(_) => {
                DentalabError::Forbidden(message)
            }
            AppError::Api(ApiError::NotFound(_)) | AppError::UnknownRoute(_) => {
                DentalabError::NotFound(message)
            }
            AppError::Api(ApiError::Conflict(_)) => DentalabError::Conflict(message),
            AppError::Api(ApiError::Transport(_)) => DentalabError::Network(message),
            AppError::Storage(_) | AppError::Config(_) => DentalabError::Storage(e.to_string()),
            _ => DentalabError::Failed(message),
        }
    }
}

impl From<serde_json::Error> for DentalabError {
    fn from(e: serde_json::Error) -> Self {
        DentalabError::InvalidInput(e.to_string())
    }
}

impl From<api::UnknownResource> for DentalabError {
    fn from(e: api::UnknownResource) -> Self {
        DentalabError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DentalabError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DentalabError::Failed(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Create a client from the config file at `config_path` (default
/// `~/.dentalab/config.toml`).
#[uniffi::export]
pub fn open_client(config_path: Option<String>) -> Result<Arc<DentalabCore>, DentalabError> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);
    let config = ClientConfig::load(&path).map_err(AppError::from)?;
    DentalabCore::from_config(&config)
}

/// Create a client for `api_base_url`, keeping local storage at
/// `storage_path`.
#[uniffi::export]
pub fn connect(api_base_url: String, storage_path: String) -> Result<Arc<DentalabCore>, DentalabError> {
    let config = ClientConfig {
        api_base_url,
        storage_path: Some(PathBuf::from(storage_path)),
        ..ClientConfig::default()
    };
    DentalabCore::from_config(&config)
}

/// Age in whole years for a birth date (`YYYY-MM-DD` or `DD.MM.YYYY`).
#[uniffi::export]
pub fn patient_age(birth_date: String) -> Option<u32> {
    dates::parse_date(&birth_date).and_then(dates::age_from_birthdate)
}

/// Permissions granted to a role name; empty for unknown roles.
#[uniffi::export]
pub fn role_permissions(role: String) -> Vec<String> {
    access::permissions_for_role_name(&role)
        .into_iter()
        .map(|p| p.as_str().to_string())
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe client wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DentalabCore {
    app: Arc<Mutex<App<HttpTransport, Database>>>,
}

impl DentalabCore {
    fn from_config(config: &ClientConfig) -> Result<Arc<Self>, DentalabError> {
        let app = App::from_config(config)?;
        Ok(Arc::new(Self {
            app: Arc::new(Mutex::new(app)),
        }))
    }
}

fn parse_permissions(names: &[String]) -> Result<Vec<Permission>, DentalabError> {
    names
        .iter()
        .map(|n| {
            n.parse::<Permission>()
                .map_err(|e| DentalabError::InvalidInput(e.to_string()))
        })
        .collect()
}

#[uniffi::export]
impl DentalabCore {
    // =========================================================================
    // Session
    // =========================================================================

    pub fn login(&self, email: String, password: String) -> Result<FfiUser, DentalabError> {
        let mut app = self.app.lock()?;
        let user = app.login(&Credentials::new(email, password))?;
        Ok(user.into())
    }

    pub fn logout(&self) -> Result<(), DentalabError> {
        let mut app = self.app.lock()?;
        app.logout()?;
        Ok(())
    }

    /// Resume the persisted session, if any.
    pub fn restore_session(&self) -> Result<bool, DentalabError> {
        let mut app = self.app.lock()?;
        Ok(app.restore()?)
    }

    pub fn current_user(&self) -> Result<Option<FfiUser>, DentalabError> {
        let app = self.app.lock()?;
        Ok(app.session().current_user().cloned().map(Into::into))
    }

    pub fn session_state(&self) -> Result<String, DentalabError> {
        let app = self.app.lock()?;
        Ok(app.session().state().name().to_string())
    }

    /// Message from the last failed login or forced logout.
    pub fn last_error(&self) -> Result<Option<String>, DentalabError> {
        let app = self.app.lock()?;
        Ok(app.session().last_error().map(str::to_string))
    }

    pub fn permissions(&self) -> Result<Vec<String>, DentalabError> {
        let app = self.app.lock()?;
        Ok(app
            .session()
            .permissions()
            .into_iter()
            .map(|p| p.as_str().to_string())
            .collect())
    }

    /// Whether the current user holds all of `permissions`.
    pub fn can(&self, permissions: Vec<String>) -> Result<bool, DentalabError> {
        let required = parse_permissions(&permissions)?;
        let app = self.app.lock()?;
        Ok(app.session().can(&required))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigation(&self) -> Result<FfiNavigation, DentalabError> {
        let app = self.app.lock()?;
        let nav = app.navigation();
        let active = nav.active(app.current_route()).map(|item| item.route);
        let convert = |items: &[&NavItem]| -> Vec<FfiNavItem> {
            items
                .iter()
                .map(|item| FfiNavItem {
                    icon: item.icon.to_string(),
                    label: item.label.to_string(),
                    route: item.route.to_string(),
                    active: Some(item.route) == active,
                })
                .collect()
        };
        Ok(FfiNavigation {
            primary: convert(&nav.primary),
            overflow: convert(&nav.overflow),
        })
    }

    pub fn navigate(&self, path: String) -> Result<FfiGuard, DentalabError> {
        let mut app = self.app.lock()?;
        Ok(app.navigate(&path)?.into())
    }

    pub fn current_route(&self) -> Result<String, DentalabError> {
        let app = self.app.lock()?;
        Ok(app.current_route().to_string())
    }

    // =========================================================================
    // Resources (JSON in, JSON out)
    // =========================================================================

    pub fn list(&self, resource: String, query: FfiListQuery) -> Result<String, DentalabError> {
        let resource = Resource::from_name(&resource)?;
        let mut app = self.app.lock()?;
        let list_query = query.into_list_query(app.list_query());
        let body = app.list_raw(resource, &list_query)?;
        Ok(serde_json::to_string(&body)?)
    }

    pub fn get(&self, resource: String, id: i64) -> Result<String, DentalabError> {
        let resource = Resource::from_name(&resource)?;
        let mut app = self.app.lock()?;
        let body = app.get_raw(resource, id)?;
        Ok(serde_json::to_string(&body)?)
    }

    pub fn create(&self, resource: String, json: String) -> Result<String, DentalabError> {
        let resource = Resource::from_name(&resource)?;
        let body: serde_json::Value = serde_json::from_str(&json)?;
        let mut app = self.app.lock()?;
        let created = app.create_raw(resource, body)?;
        Ok(serde_json::to_string(&created)?)
    }

    pub fn update(&self, resource: String, id: i64, json: String) -> Result<String, DentalabError> {
        let resource = Resource::from_name(&resource)?;
        let body: serde_json::Value = serde_json::from_str(&json)?;
        let mut app = self.app.lock()?;
        let updated = app.update_raw(resource, id, body)?;
        Ok(serde_json::to_string(&updated)?)
    }

    pub fn delete(&self, resource: String, id: i64) -> Result<(), DentalabError> {
        let resource = Resource::from_name(&resource)?;
        let mut app = self.app.lock()?;
        app.delete_raw(resource, id)?;
        Ok(())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Export one worksheet as "json", "csv" or "text".
    pub fn export_laborzettel(&self, id: i64, format: String) -> Result<String, DentalabError> {
        let mut app = self.app.lock()?;
        let zettel = app.laborzettel().get(id)?;
        let export = LaborzettelExport::from_laborzettel(&zettel);
        render_export(&format, || export.to_json(), || export.to_csv(), || {
            export.render(export::DEFAULT_TEMPLATE)
        })
    }

    /// Export several worksheets as "json" or "csv".
    pub fn export_laborzettel_batch(
        &self,
        ids: Vec<i64>,
        format: String,
    ) -> Result<String, DentalabError> {
        let mut app = self.app.lock()?;
        let mut worksheets = Vec::with_capacity(ids.len());
        for id in ids {
            worksheets.push(app.laborzettel().get(id)?);
        }
        let batch = BatchLaborzettelExport::from_laborzettel(&worksheets);
        match format.as_str() {
            "json" => Ok(batch.to_json()?),
            "csv" => Ok(batch.to_csv()),
            other => Err(DentalabError::InvalidInput(format!("Unsupported format: {}", other))),
        }
    }
}

fn render_export(
    format: &str,
    json: impl FnOnce() -> Result<String, serde_json::Error>,
    csv: impl FnOnce() -> String,
    text: impl FnOnce() -> String,
) -> Result<String, DentalabError> {
    match format {
        "json" => Ok(json()?),
        "csv" => Ok(csv()),
        "text" => Ok(text()),
        other => Err(DentalabError::InvalidInput(format!("Unsupported format: {}", other))),
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe user.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Display label, empty for unknown roles.
    pub role_label: String,
    pub clinic_id: Option<i64>,
}

impl From<User> for FfiUser {
    fn from(user: User) -> Self {
        Self {
            role_label: user.role().map(|r| r.label().to_string()).unwrap_or_default(),
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            clinic_id: user.clinic_id,
        }
    }
}

/// FFI-safe navigation entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNavItem {
    pub icon: String,
    pub label: String,
    pub route: String,
    pub active: bool,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNavigation {
    pub primary: Vec<FfiNavItem>,
    pub overflow: Vec<FfiNavItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiGuard {
    Allow,
    RedirectToLogin,
    Forbidden,
}

impl From<Guard> for FfiGuard {
    fn from(guard: Guard) -> Self {
        match guard {
            Guard::Allow => FfiGuard::Allow,
            Guard::RedirectToLogin => FfiGuard::RedirectToLogin,
            Guard::Forbidden => FfiGuard::Forbidden,
        }
    }
}

/// FFI-safe list query. Unset fields keep their defaults.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    /// "asc" or "desc"
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub filters: std::collections::HashMap<String, String>,
}

impl FfiListQuery {
    fn into_list_query(self, base: ListQuery) -> ListQuery {
        let mut query = base;
        if let Some(term) = self.search {
            query = query.search(term);
        }
        if let Some(field) = self.sort_by {
            let order = self
                .sort_order
                .as_deref()
                .and_then(api::SortOrder::parse)
                .unwrap_or_default();
            query = query.sort(field, order);
        }
        if let Some(page) = self.page {
            query = query.page(page);
        }
        if let Some(per_page) = self.per_page {
            query = query.per_page(per_page);
        }
        for (key, value) in self.filters {
            query = query.filter(key, value);
        }
        query
    }
}
