//! Scroll stations - named frame ranges for the HUD
//!
//! A station ties a frame sub-range to a semantic label ("skills" /
//! "walking"). Lookup is a linear first-match scan over a small fixed set;
//! ranges may leave gaps (the fallback station covers them) or overlap (first
//! definition wins). Stations are display-only: they never influence frame
//! selection.

use std::path::Path;

use indexmap::IndexMap;
use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::catalog::CatalogError;

/// Named inclusive frame range with an action label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollStation {
    pub name: String,
    pub start: i32,
    pub end: i32,
    pub action: String,
}

impl ScrollStation {
    pub fn new(name: &str, start: i32, end: i32, action: &str) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            action: action.into(),
        }
    }

    pub fn contains(&self, frame: i32) -> bool {
        frame >= self.start && frame <= self.end
    }
}

/// Ordered station registry. Insertion order = scan order.
#[derive(Debug, Clone, Default)]
pub struct StationSet {
    stations: IndexMap<String, ScrollStation>,
}

/// The sequence's six stations, matching the shipped 1999-frame asset set.
static DEFAULT_STATIONS: Lazy<StationSet> = Lazy::new(|| {
    StationSet::from_stations(vec![
        ScrollStation::new("hero", 0, 347, "idle"),
        ScrollStation::new("about", 348, 404, "walk_start"),
        ScrollStation::new("skills", 405, 580, "walking"),
        ScrollStation::new("projects", 732, 1135, "stop_observe"),
        ScrollStation::new("experience", 1135, 1364, "attitude_pose"),
        ScrollStation::new("contact", 1430, 1648, "sit_work"),
    ])
});

impl StationSet {
    pub fn from_stations(stations: Vec<ScrollStation>) -> Self {
        let mut map = IndexMap::with_capacity(stations.len());
        for station in stations {
            map.insert(station.name.clone(), station);
        }
        Self { stations: map }
    }

    /// Built-in station table.
    pub fn default_set() -> Self {
        DEFAULT_STATIONS.clone()
    }

    /// Load a station table from a JSON array of stations.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let stations: Vec<ScrollStation> =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        info!(
            "Loaded {} stations from {}",
            stations.len(),
            path.display()
        );
        Ok(Self::from_stations(stations))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScrollStation> {
        self.stations.values()
    }

    /// First station whose range contains the frame.
    pub fn locate(&self, frame: i32) -> Option<&ScrollStation> {
        self.stations.values().find(|s| s.contains(frame))
    }

    /// Like `locate`, but gap frames fall back to the first station.
    pub fn locate_or_default(&self, frame: i32) -> Option<&ScrollStation> {
        self.locate(frame).or_else(|| self.stations.values().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: frames inside a range resolve to their station
    #[test]
    fn test_locate() {
        let set = StationSet::default_set();
        assert_eq!(set.locate(0).unwrap().name, "hero");
        assert_eq!(set.locate(500).unwrap().name, "skills");
        assert_eq!(set.locate(1500).unwrap().name, "contact");
    }

    /// Test: gap frames (581..731 is uncovered) fall back to the first
    /// station
    #[test]
    fn test_gap_falls_back() {
        let set = StationSet::default_set();
        assert!(set.locate(600).is_none());
        assert_eq!(set.locate_or_default(600).unwrap().name, "hero");
    }

    /// Test: overlapping ranges resolve to the first definition (1135 is in
    /// both projects and experience)
    #[test]
    fn test_overlap_first_wins() {
        let set = StationSet::default_set();
        assert_eq!(set.locate(1135).unwrap().name, "projects");
        assert_eq!(set.locate(1136).unwrap().name, "experience");
    }

    /// Test: empty set locates nothing, no panic
    #[test]
    fn test_empty_set() {
        let set = StationSet::default();
        assert!(set.locate(0).is_none());
        assert!(set.locate_or_default(0).is_none());
    }

    /// Test: station JSON round-trip
    #[test]
    fn test_station_serde() {
        let json = r#"[{"name": "hero", "start": 0, "end": 10, "action": "idle"}]"#;
        let stations: Vec<ScrollStation> = serde_json::from_str(json).unwrap();
        let set = StationSet::from_stations(stations);
        assert_eq!(set.len(), 1);
        assert_eq!(set.locate(5).unwrap().action, "idle");
    }
}
