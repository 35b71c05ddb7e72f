//! Map display data for the public listing.
//!
//! The client renders tiles itself. This module only decides what to show:
//! the tile template, attribution, zoom, center and markers.

use crate::types::{Coordinates, Event, EventId};
use serde::{Deserialize, Serialize};

/// OpenStreetMap tile template.
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// OpenStreetMap attribution, as the tile license requires.
pub const DEFAULT_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Default zoom level.
pub const DEFAULT_ZOOM: u8 = 15;

/// Tile source settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Tile URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub tile_url: String,
    /// Attribution HTML
    pub attribution: String,
    /// Initial zoom
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// One event pin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    /// Event shown by the pin
    pub event_id: EventId,
    /// Popup title
    pub title: String,
    /// Popup address
    pub address: String,
    /// Pin latitude
    pub latitude: f64,
    /// Pin longitude
    pub longitude: f64,
}

impl MapMarker {
    /// Marker for `event`, `None` unless both coordinates are known.
    #[must_use]
    pub fn for_event(event: &Event) -> Option<Self> {
        let Coordinates { latitude, longitude } = event.coordinates()?;
        Some(Self {
            event_id: event.id,
            title: event.title.clone(),
            address: event.address.clone(),
            latitude,
            longitude,
        })
    }
}

/// Everything the client needs to draw a map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Tile URL template
    pub tile_url: String,
    /// Attribution HTML
    pub attribution: String,
    /// Initial zoom
    pub zoom: u8,
    /// Initial center, `None` when no event is located
    pub center: Option<Coordinates>,
    /// One marker per located event
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// Map of `events`, centered on the first located one.
    #[must_use]
    pub fn for_events(config: &MapConfig, events: &[Event]) -> Self {
        let markers: Vec<MapMarker> = events.iter().filter_map(MapMarker::for_event).collect();
        let center = markers.first().map(|marker| Coordinates {
            latitude: marker.latitude,
            longitude: marker.longitude,
        });

        Self {
            tile_url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            zoom: config.zoom,
            center,
            markers,
        }
    }

    /// Map of a single event.
    #[must_use]
    pub fn for_event(config: &MapConfig, event: &Event) -> Self {
        Self::for_events(config, std::slice::from_ref(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::event;

    #[test]
    fn default_config_uses_openstreetmap() {
        let config = MapConfig::default();

        assert_eq!(config.tile_url, "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png");
        assert!(config.attribution.contains("OpenStreetMap</a> contributors"));
        assert_eq!(config.zoom, 15);
    }

    #[test]
    fn centers_on_first_located_event() {
        let mut unlocated = event(1500, None);
        unlocated.latitude = None;
        unlocated.longitude = None;
        let located = event(2000, None);

        let view = MapView::for_events(&MapConfig::default(), &[unlocated, located.clone()]);

        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].event_id, located.id);
        assert_eq!(view.center, located.coordinates());
    }

    #[test]
    fn half_known_coordinates_get_no_marker() {
        let mut event = event(1500, None);
        event.longitude = None;

        let view = MapView::for_event(&MapConfig::default(), &event);

        assert!(view.markers.is_empty());
        assert_eq!(view.center, None);
    }
}
