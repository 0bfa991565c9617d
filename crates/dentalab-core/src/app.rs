//! The application core.
//!
//! [`App`] owns the session, the API client, the query cache and the current
//! route. Every backend call goes through it, so an "unauthorized" response
//! anywhere ends the session and routes to `/login`.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{
    ApiClient, ApiError, ApiRequest, HttpTransport, ListQuery, Resource, Transport, TransportError,
};
use crate::cache::{QueryCache, QueryKey};
use crate::config::{ClientConfig, ConfigError};
use crate::db::{Database, DbError};
use crate::models::{Credentials, User};
use crate::navigation::{NavItem, Navigation};
use crate::resources::validate_payload;
use crate::routes::{self, Guard, Page};
use crate::session::{Session, SessionError, TokenStore};
use crate::validation::FormErrors;

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

/// Errors surfaced to the UI layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please correct the highlighted fields: {0}")]
    Validation(#[from] FormErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("{0} is read-only")]
    ReadOnly(Resource),

    #[error("No page at {0}")]
    UnknownRoute(String),
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Api(ApiError::Transport(e))
    }
}

impl AppError {
    /// Whether this error ended the session.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            AppError::Api(e) => e.is_unauthorized(),
            AppError::Session(SessionError::Api(e)) => e.is_unauthorized(),
            AppError::NotAuthenticated => true,
            _ => false,
        }
    }

    /// Per-field messages, from local validation or from the backend.
    pub fn field_errors(&self) -> Vec<(String, String)> {
        match self {
            AppError::Validation(errors) | AppError::Session(SessionError::Form(errors)) => errors
                .iter()
                .map(|(f, m)| (f.to_string(), m.to_string()))
                .collect(),
            AppError::Api(ApiError::Validation { fields, .. }) => {
                fields.iter().map(|(f, m)| (f.clone(), m.clone())).collect()
            }
            _ => Vec::new(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub struct App<T, S> {
    api: ApiClient<T>,
    session: Session<S>,
    cache: QueryCache,
    route: String,
    default_page_size: u32,
}

impl App<HttpTransport, Database> {
    /// Wire up the real backend and on-disk storage from configuration.
    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        let transport = HttpTransport::from_config(config)?;
        let storage = Database::open(config.storage_path())?;
        Ok(App::new(transport, storage)
            .with_cache(QueryCache::new(config.cache_stale_after()))
            .with_default_page_size(config.default_page_size))
    }
}

impl<T: Transport, S: TokenStore> App<T, S> {
    pub fn new(transport: T, store: S) -> Self {
        Self {
            api: ApiClient::new(transport),
            session: Session::new(store),
            cache: QueryCache::default(),
            route: LOGIN_ROUTE.to_string(),
            default_page_size: crate::api::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_default_page_size(mut self, per_page: u32) -> Self {
        self.default_page_size = per_page.max(1);
        self
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// A list query with the configured page size.
    pub fn list_query(&self) -> ListQuery {
        ListQuery::new().per_page(self.default_page_size)
    }

    pub fn current_route(&self) -> &str {
        &self.route
    }

    pub fn current_page(&self) -> Option<Page> {
        routes::resolve(&self.route)
    }

    pub fn navigation(&self) -> Navigation {
        Navigation::for_optional_role(self.session.role())
    }

    /// Navigation entry to highlight for the current route.
    pub fn active_nav_item(&self) -> Option<&'static NavItem> {
        self.navigation().active(&self.route)
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    pub fn login(&mut self, credentials: &Credentials) -> AppResult<User> {
        let user = self.session.login(&self.api, credentials)?.clone();
        self.cache.clear();
        self.route = HOME_ROUTE.to_string();
        Ok(user)
    }

    /// Resume a persisted session. Returns whether it succeeded.
    pub fn restore(&mut self) -> AppResult<bool> {
        let restored = self.session.restore(&self.api)?;
        if restored && self.route == LOGIN_ROUTE {
            self.route = HOME_ROUTE.to_string();
        }
        Ok(restored)
    }

    pub fn logout(&mut self) -> AppResult<()> {
        self.session.logout(&self.api)?;
        self.cache.clear();
        self.route = LOGIN_ROUTE.to_string();
        Ok(())
    }

    fn end_session(&mut self) {
        warn!(route = %self.route, "backend rejected session");
        self.session.force_logout();
        self.cache.clear();
        self.route = LOGIN_ROUTE.to_string();
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    /// Go to `path` if the session may open it.
    ///
    /// Anonymous sessions are sent to `/login`; a forbidden page leaves the
    /// route unchanged.
    pub fn navigate(&mut self, path: &str) -> AppResult<Guard> {
        let page = routes::resolve(path).ok_or_else(|| AppError::UnknownRoute(path.to_string()))?;
        if page == Page::Login && self.session.is_authenticated() {
            self.route = HOME_ROUTE.to_string();
            return Ok(Guard::Allow);
        }

        let guard = routes::authorize(&page, &self.session);
        match guard {
            Guard::Allow => self.route = path.to_string(),
            Guard::RedirectToLogin => self.route = LOGIN_ROUTE.to_string(),
            Guard::Forbidden => debug!(path, "navigation forbidden"),
        }
        Ok(guard)
    }

    // ------------------------------------------------------------------
    // Resource calls
    // ------------------------------------------------------------------

    fn authorized(&self, request: ApiRequest) -> AppResult<ApiRequest> {
        match self.session.token() {
            Some(token) => Ok(request.with_bearer(Some(token))),
            None => Err(AppError::NotAuthenticated),
        }
    }

    fn call(&mut self, request: ApiRequest) -> AppResult<Value> {
        let request = match self.authorized(request) {
            Ok(request) => request,
            Err(e) => {
                self.route = LOGIN_ROUTE.to_string();
                return Err(e);
            }
        };
        match self.api.send(request) {
            Ok(body) => Ok(body),
            Err(e) if e.is_unauthorized() => {
                self.end_session();
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn mutated(&mut self, resource: Resource) {
        let removed = self.cache.invalidate_with_dependents(resource);
        debug!(resource = resource.name(), removed, "mutation invalidated cache");
    }

    /// List a collection. Fresh cached pages are served without a request.
    pub fn list_raw(&mut self, resource: Resource, query: &ListQuery) -> AppResult<Value> {
        let key = QueryKey::new(resource, query.cache_scope());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        let request = ApiRequest::get(resource.path()).with_query(query.to_params());
        let body = self.call(request)?;
        self.cache.put(key, body.clone());
        Ok(body)
    }

    pub fn get_raw(&mut self, resource: Resource, id: i64) -> AppResult<Value> {
        let key = QueryKey::record(resource, id);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        let body = unwrap_data(self.call(ApiRequest::get(resource.item_path(id)))?);
        self.cache.put(key, body.clone());
        Ok(body)
    }

    pub fn create_raw(&mut self, resource: Resource, body: Value) -> AppResult<Value> {
        if resource.is_read_only() {
            return Err(AppError::ReadOnly(resource));
        }
        validate_payload(resource, &body)?;
        let created = unwrap_data(self.call(ApiRequest::post(resource.path(), body))?);
        info!(resource = resource.name(), "created");
        self.mutated(resource);
        Ok(created)
    }

    pub fn update_raw(&mut self, resource: Resource, id: i64, body: Value) -> AppResult<Value> {
        if resource.is_read_only() {
            return Err(AppError::ReadOnly(resource));
        }
        validate_payload(resource, &body)?;
        let updated = unwrap_data(self.call(ApiRequest::put(resource.item_path(id), body))?);
        info!(resource = resource.name(), id, "updated");
        self.mutated(resource);
        Ok(updated)
    }

    pub fn delete_raw(&mut self, resource: Resource, id: i64) -> AppResult<()> {
        if resource.is_read_only() {
            return Err(AppError::ReadOnly(resource));
        }
        self.call(ApiRequest::delete(resource.item_path(id)))?;
        info!(resource = resource.name(), id, "deleted");
        self.mutated(resource);
        Ok(())
    }

    /// Drop cached data for a resource, forcing the next read to refetch.
    pub fn invalidate(&mut self, resource: Resource) {
        self.cache.invalidate(resource);
    }
}

/// Single-record responses may be wrapped as `{"data": {...}}`.
pub(crate) fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
