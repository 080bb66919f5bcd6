// Data models for the task list

use serde::{Deserialize, Serialize};

/// Identifier of a task within one store
pub type TaskId = i64;

/// A single to-do item
///
/// Field names on the wire match the payload written by the browser version
/// of the list, so existing snapshots load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "taskDiscription")]
    pub description: String,
    #[serde(rename = "isDone", default)]
    pub done: bool,
    /// Transient UI flag, persisted alongside the rest
    #[serde(rename = "letToEdit", default)]
    pub editing: bool,
}

impl Task {
    pub fn new(id: TaskId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
            done: false,
            editing: false,
        }
    }
}

/// Trim a user-supplied description, rejecting empty or whitespace-only text
pub fn normalize_description(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new_defaults() {
        let task = Task::new(7, "buy milk");
        assert_eq!(task.id, 7);
        assert_eq!(task.description, "buy milk");
        assert!(!task.done);
        assert!(!task.editing);
    }

    #[test]
    fn test_task_wire_names() {
        let task = Task::new(3, "water plants");
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"taskDiscription\":\"water plants\""));
        assert!(json.contains("\"id\":3"));
        assert!(json.contains("\"isDone\":false"));
        assert!(json.contains("\"letToEdit\":false"));
    }

    #[test]
    fn test_task_missing_flags_default_false() {
        let task: Task = serde_json::from_str(r#"{"taskDiscription":"walk dog","id":12}"#).unwrap();
        assert_eq!(task.id, 12);
        assert!(!task.done);
        assert!(!task.editing);
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  buy milk \n"), Some("buy milk"));
        assert_eq!(normalize_description(""), None);
        assert_eq!(normalize_description(" \t  "), None);
    }
}
