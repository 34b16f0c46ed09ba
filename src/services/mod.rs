pub mod address_search;
pub mod discovery;
pub mod export;
pub mod geolocation;
pub mod job_alerts;
pub mod nearby_view;
pub mod task_api;

pub use address_search::{AddressSearch, HttpGeocoder};
pub use discovery::TaskDiscovery;
pub use job_alerts::{HttpJobAlertApi, JobAlertService};
pub use nearby_view::NearbyTasksView;
pub use task_api::HttpTaskApi;
