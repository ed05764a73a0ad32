//! Task persistent store
//!
//! Stores the whole task list as one JSON array under the `tasks` key.
//! Every mutation reads the list, changes it in memory and writes it back.
//! Entries are decoded one by one: an entry that cannot be read is hidden
//! from listings but written back untouched. Calls on one `TaskStore` (and
//! its clones) are serialized; separate stores sharing the same key-value
//! store are last-writer-wins.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::storage::{load_raw_collection, save_collection, KeyValueStore, TASKS_KEY};
use crate::Result;

use super::model::{hms, titles_match, StatusValue, Task, TaskInput, TaskStatus};

/// On-disk task record; records written before ids existed have none
#[derive(Debug, Deserialize)]
struct StoredTask {
    #[serde(default)]
    id: Option<Uuid>,
    title: String,
    description: String,
    etat: StatusValue,
    categories: Vec<String>,
    date: NaiveDate,
    #[serde(with = "hms")]
    time: NaiveTime,
}

impl StoredTask {
    fn into_task(self, index: usize) -> Task {
        let id = self.id.unwrap_or_else(|| legacy_id(index, &self.title));
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.etat,
            categories: self.categories,
            date: self.date,
            time: self.time,
        }
    }
}

/// Id for a record stored without one.
///
/// Derived from the record's position and title, so every load agrees on it
/// until the next write stores it for good.
fn legacy_id(index: usize, title: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("task:{}:{}", index, title).as_bytes())
}

/// One entry of the stored `tasks` array
#[derive(Debug, Clone)]
enum Record {
    Task(Task),
    /// Kept verbatim so a bad entry never costs its siblings
    Unreadable(Value),
}

impl Record {
    fn decode(index: usize, value: Value) -> Self {
        match StoredTask::deserialize(&value) {
            Ok(stored) => Self::Task(stored.into_task(index)),
            Err(e) => {
                warn!("Keeping unreadable task entry {} as-is: {}", index, e);
                Self::Unreadable(value)
            }
        }
    }

    fn title(&self) -> Option<&str> {
        match self {
            Self::Task(task) => Some(&task.title),
            Self::Unreadable(value) => value.get("title").and_then(Value::as_str),
        }
    }

    fn id(&self) -> Option<Uuid> {
        match self {
            Self::Task(task) => Some(task.id),
            Self::Unreadable(value) => value
                .get("id")
                .and_then(Value::as_str)
                .and_then(|raw| Uuid::parse_str(raw).ok()),
        }
    }

    fn has_title(&self, title: &str) -> bool {
        self.title().is_some_and(|own| titles_match(own, title))
    }

    fn to_value(&self) -> Result<Value> {
        match self {
            Self::Task(task) => Ok(serde_json::to_value(task)?),
            Self::Unreadable(value) => Ok(value.clone()),
        }
    }
}

/// Task repository over a key-value store
#[derive(Clone)]
pub struct TaskStore {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles
    lock: Arc<Mutex<()>>,
}

impl TaskStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// List all readable tasks in stored order
    ///
    /// Never writes to the store.
    pub async fn list(&self) -> Result<Vec<Task>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter_map(|record| match record {
                Record::Task(task) => Some(task),
                Record::Unreadable(_) => None,
            })
            .collect())
    }

    /// Get a task by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.list().await?.into_iter().find(|t| t.id == id))
    }

    /// Find a task by title, ignoring case
    pub async fn find_by_title(&self, title: &str) -> Result<Option<Task>> {
        Ok(self.list().await?.into_iter().find(|t| t.has_title(title)))
    }

    /// Find tasks by status, in stored order
    pub async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| t.status == status)
            .collect())
    }

    /// Create a new task
    ///
    /// Field validation runs before the title uniqueness check.
    pub async fn create(&self, input: TaskInput) -> Result<Task> {
        input.validate()?;

        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        let title = input.normalized_title();
        if records.iter().any(|r| r.has_title(title)) {
            return Err(Error::DuplicateTitle(title.to_string()));
        }

        let task = input.into_task(Uuid::new_v4())?;
        records.push(Record::Task(task.clone()));

        self.persist(&records).await?;
        info!("Created task {} '{}'", task.id, task.title);
        Ok(task)
    }

    /// Replace the task currently titled `original_title` (ignoring case)
    ///
    /// The task keeps its id and its position in the list. The new title must
    /// not collide with any other task. An unreadable entry carrying that
    /// title is replaced by the new task.
    pub async fn update(&self, original_title: &str, input: TaskInput) -> Result<Task> {
        input.validate()?;

        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        let index = records
            .iter()
            .position(|r| r.has_title(original_title))
            .ok_or_else(|| Error::NotFound(format!("Task '{}' not found", original_title)))?;

        self.replace_at(&mut records, index, input).await
    }

    /// Replace the task with the given ID
    pub async fn update_by_id(&self, id: Uuid, input: TaskInput) -> Result<Task> {
        input.validate()?;

        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        let index = records
            .iter()
            .position(|r| r.id() == Some(id))
            .ok_or_else(|| Error::NotFound(format!("Task {} not found", id)))?;

        self.replace_at(&mut records, index, input).await
    }

    /// Delete every task whose title is exactly `title`
    ///
    /// Returns the number of removed tasks. Removing an unknown title is a
    /// no-op and writes nothing.
    pub async fn remove(&self, title: &str) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        let before = records.len();
        records.retain(|r| r.title() != Some(title));
        let removed = before - records.len();

        if removed > 0 {
            self.persist(&records).await?;
            info!("Removed {} task(s) titled '{}'", removed, title);
        }
        Ok(removed)
    }

    /// Delete a task by ID
    pub async fn remove_by_id(&self, id: Uuid) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        let before = records.len();
        records.retain(|r| r.id() != Some(id));
        let removed = records.len() != before;

        if removed {
            self.persist(&records).await?;
            info!("Removed task {}", id);
        }
        Ok(removed)
    }

    async fn replace_at(
        &self,
        records: &mut [Record],
        index: usize,
        input: TaskInput,
    ) -> Result<Task> {
        let title = input.normalized_title();
        let taken = records
            .iter()
            .enumerate()
            .any(|(i, r)| i != index && r.has_title(title));
        if taken {
            return Err(Error::DuplicateTitle(title.to_string()));
        }

        let id = records[index].id().unwrap_or_else(Uuid::new_v4);
        let updated = input.into_task(id)?;
        records[index] = Record::Task(updated.clone());

        self.persist(records).await?;
        info!("Updated task {} '{}'", updated.id, updated.title);
        Ok(updated)
    }

    async fn load(&self) -> Result<Vec<Record>> {
        let entries = load_raw_collection(self.store.as_ref(), TASKS_KEY).await?;
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Record::decode(index, entry))
            .collect())
    }

    async fn persist(&self, records: &[Record]) -> Result<()> {
        let entries = records
            .iter()
            .map(Record::to_value)
            .collect::<Result<Vec<_>>>()?;
        save_collection(self.store.as_ref(), TASKS_KEY, &entries).await
    }
}
