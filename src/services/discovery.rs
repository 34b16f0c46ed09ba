//! Fetches the tasks around a search origin and keeps the list the map renders.
//!
//! Each refresh is tagged with a monotonically increasing sequence number. A
//! response is only applied if no newer request was issued while it was in
//! flight, so a slow early reply can never overwrite a fresher one.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::domain::marker::to_map_tasks;
use crate::domain::search::DiscoveryFilter;
use crate::domain::task::MapTask;
use crate::services::task_api::{TaskApi, TaskQuery};

#[derive(Debug, Clone, Default)]
pub struct DiscoveryState {
    pub tasks: Vec<MapTask>,
    pub loading: bool,
    pub error: bool,
    /// Filter that produced `tasks`.
    pub filter: Option<DiscoveryFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Loaded(usize),
    Failed,
    /// A newer request was issued before this one completed.
    Superseded,
}

pub struct TaskDiscovery<A: TaskApi> {
    api: Arc<A>,
    state: RwLock<DiscoveryState>,
    latest_request: AtomicU64,
}

impl<A: TaskApi> TaskDiscovery<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(DiscoveryState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> DiscoveryState {
        self.state.read().clone()
    }

    pub fn tasks(&self) -> Vec<MapTask> {
        self.state.read().tasks.clone()
    }

    pub fn has_error(&self) -> bool {
        self.state.read().error
    }

    /// Issue one list request for `filter` and replace the task list on success.
    pub async fn refresh(&self, filter: &DiscoveryFilter) -> RefreshOutcome {
        let sequence = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write();
            state.loading = true;
            state.error = false;
        }
        let _in_flight = InFlight {
            state: &self.state,
            latest_request: &self.latest_request,
            sequence,
        };

        let query = TaskQuery::open_tasks(filter);
        debug!(sequence, radius = query.radius_km, category = ?query.category, "Requesting nearby tasks");
        let result = self.api.list_tasks(&query).await;

        let mut state = self.state.write();
        if self.latest_request.load(Ordering::SeqCst) != sequence {
            debug!(sequence, "Discarding superseded task response");
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(tasks) => {
                let markers = to_map_tasks(tasks);
                let count = markers.len();
                info!(count, radius = query.radius_km, "Loaded nearby tasks");

                state.tasks = markers;
                state.error = false;
                state.filter = Some(filter.clone());
                RefreshOutcome::Loaded(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load nearby tasks");
                state.error = true;
                RefreshOutcome::Failed
            }
        }
    }
}

/// Clears `loading` when the latest request finishes or is dropped mid-flight.
struct InFlight<'a> {
    state: &'a RwLock<DiscoveryState>,
    latest_request: &'a AtomicU64,
    sequence: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.latest_request.load(Ordering::SeqCst) == self.sequence {
            self.state.write().loading = false;
        }
    }
}
