use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::f64::consts::PI;

use crate::domain::category;
use crate::domain::geo::Coordinate;
use crate::domain::task::{MapTask, Task};

/// Pins whose coordinates agree to this many decimals share a bucket (~11 m).
pub const BUCKET_DECIMALS: i32 = 4;

/// Radial displacement applied to pins sharing a bucket, ≈89 m on the ground.
pub const MARKER_OFFSET_DEGREES: f64 = 0.0008;

type BucketKey = (OrderedFloat<f64>, OrderedFloat<f64>);

fn bucket_key(coord: &Coordinate) -> BucketKey {
    let scale = 10f64.powi(BUCKET_DECIMALS);
    (
        OrderedFloat((coord.latitude * scale).round() / scale),
        OrderedFloat((coord.longitude * scale).round() / scale),
    )
}

/// Point `distance_deg` away from `center` at `angle` radians clockwise from north.
///
/// The east component is stretched by `1 / cos(lat)` so the fan is round on the ground
/// rather than squashed into an ellipse at high latitudes.
fn displace(center: &Coordinate, distance_deg: f64, angle: f64) -> Coordinate {
    let d_lat = distance_deg * angle.cos();
    let d_lng = distance_deg * angle.sin() / center.latitude.to_radians().cos();
    Coordinate::new(center.latitude + d_lat, center.longitude + d_lng)
}

/// Where each pin should be drawn so that co-located pins fan out instead of stacking.
///
/// Output order matches input order. Singletons are returned unchanged.
pub fn display_positions(coords: &[Coordinate]) -> Vec<Coordinate> {
    let mut buckets: HashMap<BucketKey, Vec<usize>> = HashMap::new();
    for (index, coord) in coords.iter().enumerate() {
        buckets.entry(bucket_key(coord)).or_default().push(index);
    }

    let mut positions = coords.to_vec();
    for members in buckets.values().filter(|members| members.len() > 1) {
        let count = members.len() as f64;
        for (slot, &index) in members.iter().enumerate() {
            let angle = 2.0 * PI * slot as f64 / count;
            positions[index] = displace(&coords[index], MARKER_OFFSET_DEGREES, angle);
        }
    }

    positions
}

/// Attach display coordinates and category glyphs to freshly fetched tasks.
pub fn to_map_tasks(tasks: Vec<Task>) -> Vec<MapTask> {
    let coords: Vec<Coordinate> = tasks.iter().map(Task::coordinate).collect();
    let positions = display_positions(&coords);

    tasks
        .into_iter()
        .zip(positions)
        .map(|(task, display)| {
            let icon = category::icon_for(task.category.as_deref());
            MapTask { task, display, icon }
        })
        .collect()
}
