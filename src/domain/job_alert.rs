use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::geo::Coordinate;
use crate::domain::search::SearchRadius;

/// Push-notification preferences for newly posted tasks nearby.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobAlertPreferences {
    pub enabled: bool,
    pub radius: SearchRadius,
    /// Empty means every category.
    pub categories: BTreeSet<String>,
    pub location: Option<Coordinate>,
}

impl Default for JobAlertPreferences {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: SearchRadius::default(),
            categories: BTreeSet::new(),
            location: None,
        }
    }
}

impl JobAlertPreferences {
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }

    pub fn with_category_toggled(&self, category: &str) -> Self {
        let mut next = self.clone();
        if !next.categories.remove(category) {
            next.categories.insert(category.to_string());
        }
        next
    }

    pub fn with_radius(&self, radius: SearchRadius) -> Self {
        Self {
            radius,
            ..self.clone()
        }
    }

    pub fn with_location(&self, location: Coordinate) -> Self {
        Self {
            location: Some(location),
            ..self.clone()
        }
    }

    pub fn matches_category(&self, category: Option<&str>) -> bool {
        self.categories.is_empty() || category.is_some_and(|c| self.categories.contains(c))
    }
}
