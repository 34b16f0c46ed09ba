use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::geo::Coordinate;

/// A one-off paid job posting as returned by the task-listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(deserialize_with = "decimal_from_any")]
    pub budget: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub location: Option<String>, // Human readable label, e.g. "Old Town, Riga"
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub applications_count: u32,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Assigned => "assigned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Task {
    pub fn new(title: String, category: Option<String>, budget: f64, at: Coordinate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description: String::new(),
            category,
            budget,
            latitude: at.latitude,
            longitude: at.longitude,
            location: None,
            creator_id: Uuid::new_v4(),
            created_at: Utc::now(),
            is_urgent: false,
            applications_count: 0,
            status: TaskStatus::Open,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A task prepared for the map: where to draw the pin and which glyph to use.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapTask {
    #[serde(flatten)]
    pub task: Task,
    pub display: Coordinate,
    pub icon: &'static str,
}

impl MapTask {
    pub fn id(&self) -> Uuid {
        self.task.id
    }
}

/// Budgets arrive either as JSON numbers or as decimal strings ("25.00").
fn decimal_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(value) => Ok(value),
        Decimal::Text(text) => text.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}
