//! List queries and paginated responses.
//!
//! Search, sort and pagination are done by the backend; the client only
//! encodes them as query parameters.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<SortOrder> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Parameters of a list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
    /// Extra filters passed through verbatim (e.g. `clinic_id=3`)
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: None,
            sort_order: SortOrder::Asc,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query parameters in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            params.push(("search".to_string(), term.to_string()));
        }
        if let Some(field) = self.sort_by.as_deref().filter(|f| !f.is_empty()) {
            params.push(("sort_by".to_string(), field.to_string()));
            params.push(("sort_order".to_string(), self.sort_order.as_str().to_string()));
        }
        params.push(("page".to_string(), self.page.max(1).to_string()));
        params.push(("per_page".to_string(), self.per_page.max(1).to_string()));
        for (key, value) in &self.filters {
            params.push((key.clone(), value.clone()));
        }
        params
    }

    /// Cache scope for this query; equal queries share a scope.
    ///
    /// Keys and values are quoted, so a value containing `&` or `=` cannot
    /// collide with a query that carries separate parameters.
    pub fn cache_scope(&self) -> String {
        let encoded: Vec<String> = self
            .to_params()
            .iter()
            .map(|(k, v)| format!("{:?}={:?}", k, v))
            .collect();
        format!("list?{}", encoded.join("&"))
    }
}

fn default_page() -> u32 {
    1
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(alias = "items")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

impl<T> Paginated<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        if self.per_page == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

impl<T: DeserializeOwned> Paginated<T> {
    /// Decode either a paginated envelope or a bare JSON array.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.is_array() {
            let data: Vec<T> = serde_json::from_value(value)?;
            let len = data.len();
            return Ok(Self {
                data,
                total: len as u64,
                page: 1,
                per_page: len as u32,
            });
        }
        let mut page: Self = serde_json::from_value(value)?;
        if page.total == 0 && !page.data.is_empty() {
            page.total = page.data.len() as u64;
        }
        if page.per_page == 0 {
            page.per_page = page.data.len() as u32;
        }
        Ok(page)
    }
}
