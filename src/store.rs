// Task list state machine with snapshot persistence

use crate::models::{Task, TaskId, normalize_description};
use crate::snapshot;
use crate::storage::Storage;
use crate::tier::Tier;
use eyre::Result;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Ordered task list bound to a persistence slot
///
/// Pending tasks always precede completed ones; within each group the
/// insertion order is kept. Every applied mutation writes a fresh snapshot to
/// the slot, and so does dropping the store, unless the slot held data that
/// could not be read and nothing has been changed since.
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
    /// `None` once the id space above the largest id is used up
    next_id: Option<TaskId>,
    /// Slot content was partly or wholly unreadable; teardown must not overwrite it
    unreadable: bool,
    closed: bool,
}

impl<S: Storage> TaskStore<S> {
    /// Load the list from `storage`
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty list. The
    /// slot itself is left untouched until the first mutation.
    pub fn open(storage: S) -> Self {
        let (tasks, unreadable) = match storage.load() {
            Ok(Some(bytes)) => match snapshot::decode(&bytes) {
                Ok(decoded) => (decoded.tasks, decoded.skipped > 0),
                Err(e) => {
                    warn!(error = ?e, "Failed to decode task snapshot, starting empty");
                    (Vec::new(), true)
                }
            },
            Ok(None) => {
                debug!("No task snapshot found, starting empty");
                (Vec::new(), false)
            }
            Err(e) => {
                warn!(error = ?e, "Failed to load task snapshot, starting empty");
                (Vec::new(), true)
            }
        };

        let next_id = match tasks.iter().map(|t| t.id).max() {
            Some(max) => max.checked_add(1).map(|id| id.max(1)),
            None => Some(1),
        };

        let mut store = Self {
            storage,
            tasks,
            next_id,
            unreadable,
            closed: false,
        };
        store.partition();

        debug!(count = store.tasks.len(), unreadable, "Opened task store");
        store
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a pending task, returning its id
    ///
    /// Empty or whitespace-only descriptions are ignored.
    pub fn create(&mut self, description: &str) -> Option<TaskId> {
        let description = normalize_description(description)?;

        let Some(id) = self.allocate_id() else {
            warn!("No task id left to assign, task not added");
            return None;
        };

        // New tasks go last among the pending ones
        let at = self.tasks.iter().position(|t| t.done).unwrap_or(self.tasks.len());
        self.tasks.insert(at, Task::new(id, description));

        debug!(id, "Created task");
        self.persist();
        Some(id)
    }

    /// Flip the editing flag; returns false if no task has this id
    pub fn toggle_edit(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(id, "toggle_edit: no such task");
            return false;
        };

        let task = &mut self.tasks[index];
        task.editing = !task.editing;

        self.persist();
        true
    }

    /// Replace a task's description
    ///
    /// Returns false when the description is blank or the id is unknown.
    pub fn update(&mut self, id: TaskId, description: &str) -> bool {
        let Some(description) = normalize_description(description) else {
            return false;
        };
        let Some(index) = self.position(id) else {
            debug!(id, "update: no such task");
            return false;
        };

        self.tasks[index].description = description.to_string();

        self.persist();
        true
    }

    /// Delete a task; returns false if no task has this id
    pub fn remove(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(id, "remove: no such task");
            return false;
        };

        self.tasks.remove(index);

        self.persist();
        true
    }

    /// Flip the done flag and move the task to its group
    pub fn toggle_done(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(id, "toggle_done: no such task");
            return false;
        };

        let task = &mut self.tasks[index];
        task.done = !task.done;
        debug!(id, done = task.done, "Toggled task");

        self.partition();
        self.persist();
        true
    }

    /// Drop every task
    ///
    /// Ids handed out before the reset are not reused.
    pub fn reset(&mut self) {
        self.tasks.clear();
        debug!("Reset task list");
        self.persist();
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Tasks in display order: pending first, then done
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| !t.done)
            .chain(self.tasks.iter().filter(|t| t.done))
            .cloned()
            .collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.done).count()
    }

    pub fn tier(&self) -> Tier {
        Tier::from_pending(self.pending_count())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write a final snapshot, reporting failure instead of only logging it
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        if self.unreadable {
            debug!("Leaving unreadable task snapshot in place");
            return Ok(());
        }
        let bytes = snapshot::encode(&self.tasks)?;
        self.storage.save(&bytes)
    }

    /// Save the current list; failures are logged, never propagated
    ///
    /// Only mutations call this directly, so the slot may be overwritten even
    /// if it held unreadable data.
    fn persist(&mut self) -> bool {
        self.unreadable = false;
        let result = snapshot::encode(&self.tasks).and_then(|bytes| self.storage.save(&bytes));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = ?e, "Failed to save task snapshot");
                false
            }
        }
    }

    /// Next id above every id handed out so far; once that range is exhausted,
    /// the smallest positive id not in use
    fn allocate_id(&mut self) -> Option<TaskId> {
        if let Some(id) = self.next_id {
            self.next_id = id.checked_add(1);
            return Some(id);
        }

        let used: BTreeSet<TaskId> = self.tasks.iter().map(|t| t.id).collect();
        (1..=TaskId::MAX).find(|id| !used.contains(id))
    }

    /// First task with this id wins if a legacy snapshot holds duplicates
    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Stable partition: pending tasks, then done tasks
    fn partition(&mut self) {
        let (pending, done): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks).into_iter().partition(|t| !t.done);
        self.tasks = pending;
        self.tasks.extend(done);
    }
}

impl<S: Storage> Drop for TaskStore<S> {
    fn drop(&mut self) {
        if !self.closed && !self.unreadable {
            self.persist();
        }
    }
}
