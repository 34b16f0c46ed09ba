use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::geo::Coordinate;
use crate::domain::job_alert::JobAlertPreferences;
use crate::domain::optimistic::{Optimistic, OptimisticOutcome};
use crate::domain::search::SearchRadius;
use crate::error::{Result, TaskMapError};
use crate::repository::preferences_repository::PreferencesRepository;
use crate::services::geolocation::{LocationProvider, resolve_location};

pub type AlertOutcome = OptimisticOutcome<JobAlertPreferences, TaskMapError>;

#[automock]
#[async_trait]
pub trait JobAlertApi: Send + Sync {
    /// Store the preferences server-side and return what the server kept.
    async fn save_preferences(&self, prefs: &JobAlertPreferences) -> Result<JobAlertPreferences>;
}

pub struct HttpJobAlertApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpJobAlertApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl JobAlertApi for HttpJobAlertApi {
    async fn save_preferences(&self, prefs: &JobAlertPreferences) -> Result<JobAlertPreferences> {
        let url = format!("{}/job-alerts/preferences", self.base_url);

        let response = self
            .client
            .put(&url)
            .json(prefs)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TaskMapError::http(&url, e))?;

        if !response.status().is_success() {
            return Err(TaskMapError::ApiStatus {
                endpoint: url,
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|e| TaskMapError::http(&url, e))
    }
}

/// Job alert settings screen. Every change shows up immediately and is rolled
/// back if the server refuses it.
pub struct JobAlertService<A: JobAlertApi> {
    api: Arc<A>,
    store: PreferencesRepository,
    location: Arc<dyn LocationProvider>,
    fallback: Coordinate,
    geolocation_timeout: Duration,
    state: Optimistic<JobAlertPreferences>,
    displayed: watch::Sender<JobAlertPreferences>,
}

impl<A: JobAlertApi> JobAlertService<A> {
    /// Start from whatever was last confirmed on this device. An unreadable
    /// store is a [`TaskMapError::Storage`] error.
    pub async fn load(
        api: Arc<A>,
        store: PreferencesRepository,
        location: Arc<dyn LocationProvider>,
        config: &AppConfig,
    ) -> Result<Self> {
        let initial = store.get_job_alerts().await?.unwrap_or_default();

        let (displayed, _) = watch::channel(initial.clone());
        Ok(Self {
            api,
            store,
            location,
            fallback: config.default_location,
            geolocation_timeout: config.geolocation_timeout(),
            state: Optimistic::new(initial),
            displayed,
        })
    }

    pub fn preferences(&self) -> &JobAlertPreferences {
        self.state.displayed()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobAlertPreferences> {
        self.displayed.subscribe()
    }

    pub async fn set_enabled(&mut self, enabled: bool) -> AlertOutcome {
        let mut next = self.state.displayed().with_enabled(enabled);
        if enabled && next.location.is_none() {
            let here = resolve_location(self.location.as_ref(), self.geolocation_timeout, self.fallback).await;
            next = next.with_location(here);
        }
        self.commit(next).await
    }

    pub async fn toggle_category(&mut self, category: &str) -> AlertOutcome {
        let next = self.state.displayed().with_category_toggled(category);
        self.commit(next).await
    }

    pub async fn set_radius(&mut self, radius: SearchRadius) -> AlertOutcome {
        let next = self.state.displayed().with_radius(radius);
        self.commit(next).await
    }

    async fn commit(&mut self, next: JobAlertPreferences) -> AlertOutcome {
        let shown = self.state.apply(next);
        self.displayed.send_replace(shown.clone());

        let outcome = self.state.reconcile(self.api.save_preferences(&shown).await);
        self.displayed.send_replace(self.state.displayed().clone());

        match &outcome {
            OptimisticOutcome::Confirmed(saved) => {
                info!(enabled = saved.enabled, radius = %saved.radius, categories = saved.categories.len(), "Job alert preferences saved");
                if let Err(e) = self.store.set_job_alerts(saved).await {
                    warn!(error = %e, "Could not cache job alert preferences");
                }
            }
            OptimisticOutcome::RolledBack { error, .. } => {
                warn!(error = %error, "Job alert change rejected, rolled back");
            }
        }
        outcome
    }
}
