//! Task list filtering
//!
//! Pure functions over an already loaded task list. Both predicates are
//! optional and combine with AND; input order is preserved.

use chrono::NaiveDate;

use crate::task::Task;

/// Category and due-date predicates for the task list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Keep tasks carrying this category name (exact match)
    pub category: Option<String>,
    /// Keep tasks due on this date
    pub date: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Whether neither predicate is active
    pub fn is_empty(&self) -> bool {
        self.active_category().is_none() && self.date.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(category) = self.active_category() {
            if !task.has_category(category) {
                return false;
            }
        }
        if let Some(date) = self.date {
            if task.date != date {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }

    // A blank picker value means "any category"
    fn active_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Filter `tasks` by optional category name and due date
pub fn filter(tasks: &[Task], category: Option<&str>, date: Option<NaiveDate>) -> Vec<Task> {
    TaskFilter {
        category: category.map(str::to_string),
        date,
    }
    .apply(tasks)
}
