use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::geo::Coordinate;

/// Radius sent to the backend when the user picked "no limit".
pub const UNBOUNDED_RADIUS_KM: u32 = 1000;

pub const DEFAULT_RADIUS_KM: u32 = 10;

/// Search radius in kilometers. Zero means unbounded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SearchRadius(pub u32);

impl SearchRadius {
    pub const UNBOUNDED: SearchRadius = SearchRadius(0);

    pub fn km(&self) -> u32 {
        self.0
    }

    pub fn is_unbounded(&self) -> bool {
        self.0 == 0
    }

    /// The radius actually requested from the task-listing endpoint.
    pub fn effective_km(&self) -> u32 {
        if self.is_unbounded() {
            UNBOUNDED_RADIUS_KM
        } else {
            self.0
        }
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        SearchRadius(DEFAULT_RADIUS_KM)
    }
}

impl FromStr for SearchRadius {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(SearchRadius)
    }
}

impl std::fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unbounded() {
            write!(f, "everywhere")
        } else {
            write!(f, "{} km", self.0)
        }
    }
}

/// Inputs that drive a task-listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryFilter {
    pub origin: Coordinate,
    pub radius: SearchRadius,
    pub category: Option<String>,
}

impl DiscoveryFilter {
    pub fn new(origin: Coordinate, radius: SearchRadius) -> Self {
        Self {
            origin,
            radius,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_maps_to_sentinel() {
        assert_eq!(SearchRadius::UNBOUNDED.effective_km(), UNBOUNDED_RADIUS_KM);
        assert_eq!(SearchRadius(25).effective_km(), 25);
    }

    #[test]
    fn test_parse_accepts_numbers_only() {
        assert_eq!("25".parse::<SearchRadius>().unwrap(), SearchRadius(25));
        assert_eq!(" 0 ".parse::<SearchRadius>().unwrap(), SearchRadius::UNBOUNDED);
        assert!("ten".parse::<SearchRadius>().is_err());
        assert!("-5".parse::<SearchRadius>().is_err());
    }

    #[test]
    fn test_no_range_validation() {
        assert_eq!("5000".parse::<SearchRadius>().unwrap().effective_km(), 5000);
    }

    #[test]
    fn test_display() {
        assert_eq!(SearchRadius(10).to_string(), "10 km");
        assert_eq!(SearchRadius::UNBOUNDED.to_string(), "everywhere");
    }
}
