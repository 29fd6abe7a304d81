//! Named session templates.
//!
//! A template is the portable description of a session: the tasks it uses,
//! the chain order and the round count. Storage lives in
//! [`crate::storage::Database`]; applying one lives on the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Task, TaskId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTemplate {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
    pub chain: Vec<TaskId>,
    pub rounds_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl SessionTemplate {
    pub fn new(
        name: impl Into<String>,
        tasks: Vec<Task>,
        chain: Vec<TaskId>,
        rounds_count: usize,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            tasks,
            chain,
            rounds_count,
            saved_at,
        }
    }

    /// Look up a task definition carried by the template.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_persisted_record_shape() {
        let json = r#"{
            "id": "tpl-1",
            "name": "Morning",
            "tasks": [
                {"id": "a", "name": "Stretch", "targetSec": 180},
                {"id": "b", "name": "Read", "targetSec": 300}
            ],
            "chain": ["a", "b", "a"],
            "roundsCount": 2,
            "savedAt": "2026-01-01T07:00:00Z"
        }"#;

        let tpl = SessionTemplate::from_json(json).unwrap();
        assert_eq!(tpl.name, "Morning");
        assert_eq!(tpl.chain.len(), 3);
        assert_eq!(tpl.rounds_count, 2);
        assert_eq!(tpl.task(&TaskId::from("b")).map(|t| t.target_sec), Some(300));
    }
}
