use async_trait::async_trait;
use mockall::automock;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::search::DiscoveryFilter;
use crate::domain::task::{Task, TaskStatus};
use crate::error::{Result, TaskMapError};

/// Parameters of a single task-listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: u32,
    pub status: TaskStatus,
    pub category: Option<String>,
}

impl TaskQuery {
    pub fn open_tasks(filter: &DiscoveryFilter) -> Self {
        Self {
            latitude: filter.origin.latitude,
            longitude: filter.origin.longitude,
            radius_km: filter.radius.effective_km(),
            status: TaskStatus::Open,
            category: filter.category.clone(),
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("radius", self.radius_km.to_string()),
            ("status", self.status.as_str().to_string()),
        ];
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        params
    }
}

#[automock]
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>>;
}

/// Task listing over the marketplace REST API.
#[derive(Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    #[instrument(skip(self), fields(radius = query.radius_km, category = ?query.category))]
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let url = self.tasks_url();

        let response = self
            .client
            .get(&url)
            .query(&query.to_params())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TaskMapError::Timeout {
                        duration_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    TaskMapError::http(&url, e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskMapError::ApiStatus {
                endpoint: url,
                status: status.as_u16(),
            });
        }

        let tasks: Vec<Task> = response.json().await.map_err(|e| TaskMapError::http(&url, e))?;
        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }
}
