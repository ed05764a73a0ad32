//! Application state

use std::sync::Arc;
use tracing::info;

use crate::category::{CategoryIdPool, CategoryStore};
use crate::config::Config;
use crate::storage::{FileKvStore, KeyValueStore};
use crate::summary::{count_by_status, StatusCounts};
use crate::task::TaskStore;
use crate::Result;

/// Both repositories over one shared key-value store
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    categories: CategoryStore,
    tasks: TaskStore,
}

impl AppState {
    /// Create a new AppState backed by files under `config.data_dir`
    pub fn new(config: &Config) -> Self {
        info!("Using data directory: {:?}", config.data_dir);
        let store = Arc::new(FileKvStore::new(config.data_dir.clone()));
        Self::with_store(store, config.category_pool())
    }

    /// Create a new AppState from the environment configuration
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(&Config::from_env()?))
    }

    /// Create a new AppState over any key-value store
    pub fn with_store(store: Arc<dyn KeyValueStore>, pool: CategoryIdPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                categories: CategoryStore::new(store.clone(), pool),
                tasks: TaskStore::new(store),
            }),
        }
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.inner.categories
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.inner.tasks
    }

    /// Per-status counts over every stored task
    pub async fn summary(&self) -> Result<StatusCounts> {
        let tasks = self.inner.tasks.list().await?;
        Ok(count_by_status(&tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TaskFilter;
    use crate::storage::MemoryKvStore;
    use crate::task::{TaskInput, TaskStatus};
    use crate::Error;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::tempdir;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "taskbook_core=debug".into()),
            )
            .with_test_writer()
            .try_init();
    }

    fn due() -> (NaiveDate, NaiveTime) {
        (
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveTime::from_hms_opt(17, 45, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_new_task_flow() {
        init_tracing();
        let dir = tempdir().unwrap();
        let config = Config::default().with_data_dir(dir.path());
        let state = AppState::new(&config);

        let work = state.categories().add("Work").await.unwrap();
        let home = state.categories().add("Home").await.unwrap();

        // The form selects categories by id and stores their names
        let names = state
            .categories()
            .resolve_names(&[home.id, work.id])
            .await
            .unwrap();
        let (date, time) = due();
        let task = state
            .tasks()
            .create(
                TaskInput::new("Paint fence", "Two coats", date, time)
                    .with_status(TaskStatus::Approved)
                    .with_categories(names),
            )
            .await
            .unwrap();
        assert_eq!(task.categories, vec!["Home", "Work"]);

        // A second state over the same directory sees the same data
        let reopened = AppState::new(&config);
        assert_eq!(reopened.tasks().list().await.unwrap(), vec![task]);
        assert_eq!(reopened.categories().list().await.unwrap().len(), 2);
        assert!(dir.path().join("tasks.json").exists());
        assert!(dir.path().join("categories.json").exists());
    }

    #[tokio::test]
    async fn test_category_changes_do_not_touch_tasks() {
        init_tracing();
        let state = AppState::with_store(Arc::new(MemoryKvStore::new()), CategoryIdPool::default());

        let work = state.categories().add("Work").await.unwrap();
        let (date, time) = due();
        state
            .tasks()
            .create(
                TaskInput::new("Report", "Monthly", date, time)
                    .with_status(TaskStatus::New)
                    .with_category("Work"),
            )
            .await
            .unwrap();

        state.categories().rename(work.id, "Job").await.unwrap();
        let task = state.tasks().find_by_title("report").await.unwrap().unwrap();
        assert_eq!(task.categories, vec!["Work"]);

        state.categories().remove(work.id).await.unwrap();
        let tasks = state.tasks().list().await.unwrap();
        assert_eq!(TaskFilter::new().with_category("Work").apply(&tasks).len(), 1);
        assert!(state
            .categories()
            .ids_for_names(&task.categories)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_summary_and_pool_limit() {
        init_tracing();
        let state = AppState::with_store(Arc::new(MemoryKvStore::new()), CategoryIdPool::new(1));

        state.categories().add("Only").await.unwrap();
        match state.categories().add("Another").await {
            Err(Error::NoIdAvailable { pool_size: 1 }) => {}
            other => panic!("Expected NoIdAvailable, got: {:?}", other),
        }

        let (date, time) = due();
        for (title, status) in [
            ("a", TaskStatus::InProgress),
            ("b", TaskStatus::InProgress),
            ("c", TaskStatus::Done),
        ] {
            state
                .tasks()
                .create(
                    TaskInput::new(title, "x", date, time)
                        .with_status(status)
                        .with_category("Only"),
                )
                .await
                .unwrap();
        }

        let summary = state.summary().await.unwrap();
        assert_eq!(summary.get(TaskStatus::InProgress), 2);
        assert_eq!(summary.get(TaskStatus::Done), 1);
        assert_eq!(summary.total(), 3);
    }
}
