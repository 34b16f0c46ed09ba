use serde::Serialize;

use crate::domain::geo::Coordinate;
use crate::domain::search::SearchRadius;

/// Zoom used when the radius is unbounded and the whole country is shown.
pub const COUNTRY_ZOOM: u8 = 7;

/// Geographic center of Latvia.
pub const COUNTRY_CENTER: Coordinate = Coordinate {
    latitude: 56.8796,
    longitude: 24.6032,
};

/// Upper radius bound (inclusive, km) and the zoom level that fits it.
const ZOOM_TABLE: &[(u32, u8)] = &[(5, 13), (10, 12), (25, 11), (50, 10)];
const FALLBACK_ZOOM: u8 = 9;

pub fn zoom_for_radius(radius: SearchRadius) -> u8 {
    if radius.is_unbounded() {
        return COUNTRY_ZOOM;
    }

    ZOOM_TABLE
        .iter()
        .find(|(max_km, _)| radius.km() <= *max_km)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(FALLBACK_ZOOM)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MapViewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl MapViewport {
    pub fn for_search(origin: Coordinate, radius: SearchRadius) -> Self {
        let center = if radius.is_unbounded() { COUNTRY_CENTER } else { origin };
        Self {
            center,
            zoom: zoom_for_radius(radius),
        }
    }
}

/// Recenters the map when the search origin or radius changes.
#[derive(Debug, Default)]
pub struct MapController {
    last_inputs: Option<(Coordinate, SearchRadius)>,
    viewport: Option<MapViewport>,
}

impl MapController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new viewport if either input changed, `None` otherwise.
    pub fn update(&mut self, origin: Coordinate, radius: SearchRadius) -> Option<MapViewport> {
        if self.last_inputs == Some((origin, radius)) {
            return None;
        }

        let viewport = MapViewport::for_search(origin, radius);
        self.last_inputs = Some((origin, radius));
        self.viewport = Some(viewport);
        Some(viewport)
    }

    /// Pan to a single point without touching the zoom, e.g. a selected pin.
    pub fn focus(&mut self, point: Coordinate) -> Option<MapViewport> {
        let viewport = self.viewport.as_mut()?;
        viewport.center = point;
        Some(*viewport)
    }

    pub fn viewport(&self) -> Option<MapViewport> {
        self.viewport
    }
}
