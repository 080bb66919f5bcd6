// Snapshot encoding for the persisted task list

use crate::models::Task;
use eyre::{Context, Result, eyre};
use serde_json::Value;
use tracing::{debug, warn};

/// Encode the task list as a JSON array of task objects
pub fn encode(tasks: &[Task]) -> Result<Vec<u8>> {
    serde_json::to_vec(tasks).context("Failed to serialize task snapshot")
}

/// Tasks recovered from a payload, plus how many entries were unreadable
#[derive(Debug, Default)]
pub struct Decoded {
    pub tasks: Vec<Task>,
    pub skipped: usize,
}

/// Decode a snapshot payload
///
/// The payload must be a JSON array. Elements that don't parse as a task are
/// skipped with a warning rather than failing the whole snapshot. An empty
/// payload decodes to an empty list.
pub fn decode(bytes: &[u8]) -> Result<Decoded> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Decoded::default());
    }

    let value: Value = serde_json::from_slice(bytes).context("Failed to parse task snapshot")?;
    let entries = match value {
        Value::Array(entries) => entries,
        other => return Err(eyre!("Task snapshot is not an array (found {})", kind_of(&other))),
    };

    let mut decoded = Decoded {
        tasks: Vec::with_capacity(entries.len()),
        skipped: 0,
    };
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Task>(entry) {
            Ok(task) => decoded.tasks.push(task),
            Err(e) => {
                warn!(index, error = ?e, "Failed to parse task entry, skipping");
                decoded.skipped += 1;
            }
        }
    }

    debug!(count = decoded.tasks.len(), skipped = decoded.skipped, "Decoded task snapshot");
    Ok(decoded)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Task> {
        let mut done = Task::new(2, "file taxes");
        done.done = true;
        let mut editing = Task::new(5, "call mom");
        editing.editing = true;
        vec![Task::new(1, "buy milk"), editing, done]
    }

    #[test]
    fn test_encode_then_decode_preserves_tasks() {
        let tasks = sample();
        let bytes = encode(&tasks).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.tasks, tasks);
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn test_decode_legacy_payload() {
        let payload = br#"[{"taskDiscription":"learn react","id":417,"isDone":false,"letToEdit":false},{"taskDiscription":"do dishes","id":88,"isDone":true,"letToEdit":true}]"#;

        let tasks = decode(payload).unwrap().tasks;
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, 417);
        assert_eq!(tasks[0].description, "learn react");
        assert!(tasks[1].done);
        assert!(tasks[1].editing);
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(decode(b"").unwrap().tasks.is_empty());
        assert!(decode(b"  \n").unwrap().tasks.is_empty());
        assert!(decode(b"[]").unwrap().tasks.is_empty());
    }

    #[test]
    fn test_decode_skips_malformed_entries() {
        let payload = br#"[{"taskDiscription":"valid","id":1},{"id":"not a number"},42,{"taskDiscription":"also valid","id":2,"isDone":true}]"#;

        let decoded = decode(payload).unwrap();
        assert_eq!(decoded.skipped, 2);
        let tasks = decoded.tasks;
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "valid");
        assert_eq!(tasks[1].description, "also valid");
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode(br#"{"tasks":[]}"#).unwrap_err();
        assert!(err.to_string().contains("not an array"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"{malformed json").is_err());
    }
}
