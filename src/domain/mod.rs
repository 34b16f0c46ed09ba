pub mod category;
pub mod geo;
pub mod job_alert;
pub mod marker;
pub mod optimistic;
pub mod search;
pub mod sheet;
pub mod spatial;
pub mod task;
pub mod viewport;
