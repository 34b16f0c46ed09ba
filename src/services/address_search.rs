//! Search-as-you-type for addresses.
//!
//! Every keystroke cancels the previously scheduled lookup and schedules a new
//! one after the debounce window. A lookup that is already talking to the
//! geocoder when a newer keystroke arrives is aborted and its answer dropped.

use async_trait::async_trait;
use mockall::automock;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::geo::Coordinate;
use crate::error::{Result, TaskMapError};

pub const MIN_QUERY_CHARS: usize = 3;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressSuggestion {
    pub label: String,
    pub coordinate: Coordinate,
}

#[automock]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<AddressSuggestion>>;
}

/// Nominatim-compatible forward geocoder.
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
    countries: Vec<String>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl HttpGeocoder {
    pub fn new(base_url: impl Into<String>, countries: Vec<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            countries,
            timeout,
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<AddressSuggestion>> {
        let url = format!("{}/search", self.base_url);
        let limit = MAX_SUGGESTIONS.to_string();
        let mut params = vec![("q", query.to_string()), ("format", "json".to_string()), ("limit", limit)];
        if !self.countries.is_empty() {
            params.push(("countrycodes", self.countries.join(",")));
        }

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, concat!("taskmap/", env!("CARGO_PKG_VERSION")))
            .query(&params)
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

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| TaskMapError::http(&url, e))?;

        // Places with unparseable coordinates are dropped rather than failing the whole lookup
        Ok(places
            .into_iter()
            .filter_map(|place| {
                let latitude = place.lat.parse().ok()?;
                let longitude = place.lon.parse().ok()?;
                Some(AddressSuggestion {
                    label: place.display_name,
                    coordinate: Coordinate::new(latitude, longitude),
                })
            })
            .collect())
    }
}

/// Latest suggestions for the text currently in the search box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub suggestions: Vec<AddressSuggestion>,
    pub error: bool,
}

pub struct AddressSearch<G: Geocoder + 'static> {
    geocoder: Arc<G>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    results: watch::Sender<SearchResults>,
}

impl<G: Geocoder + 'static> AddressSearch<G> {
    pub fn new(geocoder: Arc<G>, debounce: Duration) -> Self {
        let (results, _) = watch::channel(SearchResults::default());
        Self {
            geocoder,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            results,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results.subscribe()
    }

    pub fn current(&self) -> SearchResults {
        self.results.borrow().clone()
    }

    /// Feed the current contents of the search box. Must be called inside a Tokio runtime.
    pub fn input(&self, text: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_pending();

        let query = text.trim().to_string();
        if query.chars().count() < MIN_QUERY_CHARS {
            self.results.send_replace(SearchResults {
                query,
                ..Default::default()
            });
            return;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let latest = Arc::clone(&self.generation);
        let results = self.results.clone();
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            debug!(%query, "Geocoding address");
            let outcome = geocoder.search(&query).await;

            let next = match outcome {
                Ok(suggestions) => SearchResults {
                    query,
                    suggestions,
                    error: false,
                },
                Err(e) => {
                    warn!(error = %e, "Address lookup failed");
                    SearchResults {
                        query,
                        suggestions: Vec::new(),
                        error: true,
                    }
                }
            };
            // Checked under the channel lock so a newer keystroke cannot slip in between
            let published = results.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = next;
                true
            });
            if !published {
                debug!("Dropping superseded geocoder answer");
            }
        });

        *self.pending.lock() = Some(handle);
    }

    /// Abandon whatever is scheduled or in flight, e.g. when the search box closes.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel_pending();
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl<G: Geocoder + 'static> Drop for AddressSearch<G> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
