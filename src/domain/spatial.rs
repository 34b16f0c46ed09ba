use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use uuid::Uuid;

use crate::domain::geo::{Coordinate, EARTH_RADIUS_KM, haversine_distance};
use crate::domain::task::MapTask;

type Entry = GeomWithData<[f64; 2], Uuid>;

/// R-tree over the drawn pin positions, used for tap hit-testing.
pub struct MarkerIndex {
    tree: RTree<Entry>,
}

impl MarkerIndex {
    pub fn build(markers: &[MapTask]) -> Self {
        let entries = markers
            .iter()
            .filter(|m| m.display.latitude.is_finite() && m.display.longitude.is_finite())
            .map(|m| GeomWithData::new([m.display.latitude, m.display.longitude], m.id()))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest pin to `point`, if it lies within `max_km` on the ground.
    pub fn nearest(&self, point: &Coordinate, max_km: f64) -> Option<Uuid> {
        self.tree
            .nearest_neighbor_iter(&[point.latitude, point.longitude])
            .take(8)
            .map(|entry| (entry.data, haversine_distance(point, &to_coordinate(entry))))
            .filter(|(_, km)| *km <= max_km)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Every pin within `radius_km` of `origin`.
    pub fn within_radius(&self, origin: &Coordinate, radius_km: f64) -> Vec<Uuid> {
        let d_lat = (radius_km / EARTH_RADIUS_KM).to_degrees();
        let cos_lat = origin.latitude.to_radians().cos().abs().max(1e-6);
        let d_lng = (d_lat / cos_lat).min(180.0);

        let envelope = AABB::from_corners(
            [origin.latitude - d_lat, origin.longitude - d_lng],
            [origin.latitude + d_lat, origin.longitude + d_lng],
        );

        self.tree
            .locate_in_envelope(&envelope)
            .filter(|entry| haversine_distance(origin, &to_coordinate(entry)) <= radius_km)
            .map(|entry| entry.data)
            .collect()
    }
}

fn to_coordinate(entry: &Entry) -> Coordinate {
    let [latitude, longitude] = *entry.geom();
    Coordinate::new(latitude, longitude)
}
