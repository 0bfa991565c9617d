//! Generic resource CRUD commands.
//!
//! `dentalab get patients`, `dentalab create clinic`, etc. Resource names go
//! through the core's resource table, which also suggests near misses.

use std::path::Path;

use anyhow::Result;
use dentalab_core::api::SortOrder;
use dentalab_core::{ListQuery, Paginated, Resource};
use serde_json::Value;

use super::{fail, logged_in, print_json};
use crate::Output;

/// List options collected from the command line.
#[derive(Debug, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
    pub page: u32,
    pub per_page: Option<u32>,
    pub filters: Vec<String>,
}

impl ListParams {
    fn to_query(&self, base: ListQuery) -> Result<ListQuery> {
        let mut query = base.page(self.page);
        if let Some(per_page) = self.per_page {
            query = query.per_page(per_page);
        }
        if let Some(term) = &self.search {
            query = query.search(term.as_str());
        }
        if let Some(field) = &self.sort {
            let order = if self.desc { SortOrder::Desc } else { SortOrder::Asc };
            query = query.sort(field.as_str(), order);
        }
        for filter in &self.filters {
            let (key, value) = filter
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Filter must look like key=value: {}", filter))?;
            query = query.filter(key.trim(), value.trim());
        }
        Ok(query)
    }
}

fn parse_body(json_body: &str) -> Result<Value> {
    serde_json::from_str(json_body).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))
}

/// First field that reads like a record title.
fn title(record: &Value) -> String {
    if let (Some(first), Some(last)) = (
        record.get("first_name").and_then(Value::as_str),
        record.get("last_name").and_then(Value::as_str),
    ) {
        return format!("{}, {}", last, first);
    }
    ["name", "number", "lot_number", "label", "title", "description", "action"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .unwrap_or("")
        .to_string()
}

fn print_table(page: &Paginated<Value>) {
    for record in &page.data {
        let id = record.get("id").map(Value::to_string).unwrap_or_default();
        println!("{:>6}  {}", id, title(record));
    }
    println!(
        "-- page {} of {} ({} total)",
        page.page,
        page.total_pages().max(1),
        page.total
    );
}

/// GET a resource (list or single record).
pub fn get(
    resource: &str,
    id: Option<i64>,
    params: &ListParams,
    output: Output,
    client_config_path: &Path,
) -> Result<()> {
    let resource = Resource::from_name(resource)?;
    let mut app = logged_in(client_config_path)?;

    if let Some(id) = id {
        let record = app.get_raw(resource, id).map_err(fail)?;
        return print_json(&record);
    }

    let query = params.to_query(app.list_query())?;
    let body = app.list_raw(resource, &query).map_err(fail)?;
    match output {
        Output::Json => print_json(&body),
        Output::Table => {
            let page: Paginated<Value> = Paginated::from_value(body)?;
            print_table(&page);
            Ok(())
        }
    }
}

/// CREATE a resource.
pub fn create(resource: &str, json_body: &str, client_config_path: &Path) -> Result<()> {
    let resource = Resource::from_name(resource)?;
    let body = parse_body(json_body)?;
    let mut app = logged_in(client_config_path)?;
    let created = app.create_raw(resource, body).map_err(fail)?;
    println!("{} created.", resource.label());
    print_json(&created)
}

/// UPDATE a resource.
pub fn update(resource: &str, id: i64, json_body: &str, client_config_path: &Path) -> Result<()> {
    let resource = Resource::from_name(resource)?;
    let body = parse_body(json_body)?;
    let mut app = logged_in(client_config_path)?;
    let updated = app.update_raw(resource, id, body).map_err(fail)?;
    println!("{} {} updated.", resource.label(), id);
    print_json(&updated)
}

/// DELETE a resource.
pub fn delete(resource: &str, id: i64, client_config_path: &Path) -> Result<()> {
    let resource = Resource::from_name(resource)?;
    let mut app = logged_in(client_config_path)?;
    app.delete_raw(resource, id).map_err(fail)?;
    println!("{} {} deleted.", resource.label(), id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_from_params() {
        let params = ListParams {
            search: Some("muster".into()),
            sort: Some("last_name".into()),
            desc: true,
            page: 3,
            per_page: Some(10),
            filters: vec!["clinic_id=4".into()],
        };
        let query = params.to_query(ListQuery::new()).unwrap();
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 10);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert_eq!(query.filters.get("clinic_id").map(String::as_str), Some("4"));
    }

    #[test]
    fn test_bad_filter() {
        let params = ListParams {
            page: 1,
            filters: vec!["clinic_id".into()],
            ..ListParams::default()
        };
        assert!(params.to_query(ListQuery::new()).is_err());
    }

    #[test]
    fn test_title() {
        assert_eq!(title(&json!({"first_name": "Max", "last_name": "Muster"})), "Muster, Max");
        assert_eq!(title(&json!({"lot_number": "L-7"})), "L-7");
        assert_eq!(title(&json!({"id": 1})), "");
    }
}
