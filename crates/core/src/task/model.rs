//! Task model definitions

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

/// Workflow stage of a task (`etat`)
///
/// Every reader and writer goes through [`TaskStatus::as_str`] and
/// [`TaskStatus::from_str`], so older spellings of a status ("En cours",
/// "Terminee", ...) all load as the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskStatus {
    New,
    Approved,
    InProgress,
    Ready,
    InTest,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::New
    }
}

impl TaskStatus {
    /// All statuses in workflow order
    pub const ALL: [TaskStatus; 6] = [
        Self::New,
        Self::Approved,
        Self::InProgress,
        Self::Ready,
        Self::InTest,
        Self::Done,
    ];

    /// Value written to the store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "Nouveau",
            Self::Approved => "Approuvée",
            Self::InProgress => "Encours",
            Self::Ready => "Prête",
            Self::InTest => "Entest",
            Self::Done => "Terminée",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "Nouveau",
            Self::Approved => "Approuvée",
            Self::InProgress => "En cours",
            Self::Ready => "Prête",
            Self::InTest => "En test",
            Self::Done => "Terminée",
        }
    }
}

/// Lowercase, drop separators and fold the accents used by status names
fn normalize_status(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' => 'a',
            'î' | 'ï' => 'i',
            'ô' => 'o',
            'ù' | 'û' => 'u',
            other => other,
        })
        .collect()
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_status(s).as_str() {
            "nouveau" | "new" => Ok(Self::New),
            "approuvee" | "approuve" | "approved" => Ok(Self::Approved),
            "encours" | "inprogress" => Ok(Self::InProgress),
            "prete" | "pret" | "ready" => Ok(Self::Ready),
            "entest" | "intest" => Ok(Self::InTest),
            "terminee" | "termine" | "done" => Ok(Self::Done),
            _ => Err(format!("unknown task status '{}'", s)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Stored `etat` of a task
///
/// A spelling no [`TaskStatus`] accepts is kept verbatim and written back
/// unchanged; such tasks are listed but belong to no status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusValue {
    Known(TaskStatus),
    Unrecognized(String),
}

impl StatusValue {
    pub fn known(&self) -> Option<TaskStatus> {
        match self {
            Self::Known(status) => Some(*status),
            Self::Unrecognized(_) => None,
        }
    }

    /// Value written to the store
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(status) => status.as_str(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<TaskStatus> for StatusValue {
    fn from(status: TaskStatus) -> Self {
        Self::Known(status)
    }
}

impl From<&str> for StatusValue {
    fn from(raw: &str) -> Self {
        match raw.parse() {
            Ok(status) => Self::Known(status),
            Err(_) => Self::Unrecognized(raw.to_string()),
        }
    }
}

impl PartialEq<TaskStatus> for StatusValue {
    fn eq(&self, other: &TaskStatus) -> bool {
        self.known() == Some(*other)
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(status) => fmt::Display::fmt(status, f),
            Self::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for StatusValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// `HH:MM:SS` time-of-day encoding
pub(crate) mod hms {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| raw.parse::<NaiveTime>())
            .map_err(serde::de::Error::custom)
    }
}

/// A task in the task book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "etat")]
    pub status: StatusValue,
    /// Category names as they were when the task was saved
    pub categories: Vec<String>,
    /// Due date, stored as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Due time, stored as `HH:MM:SS`
    #[serde(with = "hms")]
    pub time: NaiveTime,
}

impl Task {
    /// Case-insensitive title comparison, ignoring surrounding whitespace
    pub fn has_title(&self, title: &str) -> bool {
        titles_match(&self.title, title)
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }
}

pub(crate) fn titles_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// A task form field that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Title,
    Description,
    Status,
    Categories,
}

impl TaskField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Status => "status",
            Self::Categories => "categories",
        }
    }
}

/// Values submitted by the new-task and edit-task forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub categories: Vec<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TaskInput {
    /// Create an input with no status and no categories selected
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
            categories: Vec::new(),
            date,
            time,
        }
    }

    /// Set the status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Select one more category
    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.categories.push(name.into());
        self
    }

    /// Replace the selected categories
    pub fn with_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = names.into_iter().map(Into::into).collect();
        self
    }

    /// Title as it will be stored
    pub fn normalized_title(&self) -> &str {
        self.title.trim()
    }

    /// Every field that fails validation, in form order
    pub fn missing_fields(&self) -> Vec<TaskField> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push(TaskField::Title);
        }
        if self.description.trim().is_empty() {
            missing.push(TaskField::Description);
        }
        if self.status.is_none() {
            missing.push(TaskField::Status);
        }
        if self.categories.iter().all(|c| c.trim().is_empty()) {
            missing.push(TaskField::Categories);
        }
        missing
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(missing))
        }
    }

    /// Build the stored task under the given id
    pub(crate) fn into_task(self, id: Uuid) -> Result<Task> {
        self.validate()?;
        let status = self
            .status
            .ok_or_else(|| Error::ValidationFailed(vec![TaskField::Status]))?;
        let time = self.time.with_nanosecond(0).unwrap_or(self.time);

        Ok(Task {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            status: StatusValue::Known(status),
            categories: self
                .categories
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            date: self.date,
            time,
        })
    }
}
