//! Activity log entries (read-only audit trail kept by the backend).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLog {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// e.g. "created", "updated", "deleted", "login"
    pub action: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

impl ActivityLog {
    /// One-line summary, e.g. "Anna created patient #12".
    pub fn summary(&self) -> String {
        let who = self.user_name.as_deref().unwrap_or("system");
        match (&self.entity_type, self.entity_id) {
            (Some(kind), Some(id)) => format!("{} {} {} #{}", who, self.action, kind, id),
            (Some(kind), None) => format!("{} {} {}", who, self.action, kind),
            _ => format!("{} {}", who, self.action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let entry: ActivityLog = serde_json::from_value(serde_json::json!({
            "id": 1,
            "user_name": "Anna",
            "action": "created",
            "entity_type": "patient",
            "entity_id": 12,
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(entry.summary(), "Anna created patient #12");
    }
}
