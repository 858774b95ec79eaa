//! Map widget capability
//!
//! The controller never talks to a concrete map renderer. It drives a
//! [`MapSurface`], and clicks come back to it as `Input::MapClick`.
//! [`HeadlessMap`] records every layer and viewport change as plain data, so
//! it can be serialized to a browser front end or inspected in tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_distance, LatLng, LatLngBounds};

// ============================================================================
// LAYER TYPES
// ============================================================================

/// Handle to a marker or line added to the map
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

/// Base tile layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileLayer {
    /// Dark basemap without place names, shown while guessing
    Unlabeled,
    /// Dark basemap with place names, shown after a guess
    Labeled,
    /// Standard OpenStreetMap tiles
    OpenStreetMap,
}

impl TileLayer {
    pub const ALL: [TileLayer; 3] = [TileLayer::Unlabeled, TileLayer::Labeled, TileLayer::OpenStreetMap];

    pub fn url_template(self) -> &'static str {
        match self {
            TileLayer::Unlabeled => "https://{s}.basemaps.cartocdn.com/dark_nolabels/{z}/{x}/{y}{r}.png",
            TileLayer::Labeled => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            TileLayer::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        }
    }

    pub fn attribution(self) -> &'static str {
        match self {
            TileLayer::Unlabeled | TileLayer::Labeled => "&copy; OpenStreetMap & CARTO",
            TileLayer::OpenStreetMap => "&copy; OpenStreetMap contributors",
        }
    }
}

/// Which marker to draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// The player's pending guess
    Guess,
    /// The station's real position
    Truth,
}

impl MarkerKind {
    /// Icon size in pixels (square)
    pub fn icon_size(self) -> u32 {
        match self {
            MarkerKind::Guess => 24,
            MarkerKind::Truth => 28,
        }
    }
}

/// Stroke for the result line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
    pub dash_array: Option<String>,
}

impl LineStyle {
    /// Dashed red line joining guess and station
    pub fn result_line() -> Self {
        Self {
            color: "#ef4444".to_string(),
            weight: 2,
            opacity: 0.7,
            dash_array: Some("8, 8".to_string()),
        }
    }
}

/// A drawn overlay
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Marker { kind: MarkerKind, at: LatLng },
    Line { from: LatLng, to: LatLng, style: LineStyle },
}

/// Where the map is looking
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Viewport {
    Centered { center: LatLng, zoom: u8 },
    Fitted { bounds: LatLngBounds, padding: u32 },
}

// ============================================================================
// CAPABILITY TRAIT
// ============================================================================

/// What the round controller needs from a map widget
pub trait MapSurface {
    fn place_marker(&mut self, kind: MarkerKind, at: LatLng) -> LayerId;

    fn draw_line(&mut self, from: LatLng, to: LatLng, style: LineStyle) -> LayerId;

    /// Removing an unknown id is a no-op
    fn remove_layer(&mut self, id: LayerId);

    /// Distance in meters between two points
    fn distance_between(&self, a: LatLng, b: LatLng) -> f64 {
        haversine_distance(a, b)
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds, padding: u32);

    fn set_tile_layer(&mut self, layer: TileLayer);

    fn set_view(&mut self, center: LatLng, zoom: u8);
}

// ============================================================================
// HEADLESS IMPLEMENTATION
// ============================================================================

/// In-memory map that records what a real widget would show
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadlessMap {
    pub tile_layer: TileLayer,
    pub viewport: Viewport,
    pub layers: BTreeMap<LayerId, Layer>,
    #[serde(skip)]
    next_id: u32,
}

impl HeadlessMap {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            tile_layer: TileLayer::Unlabeled,
            viewport: Viewport::Centered { center, zoom },
            layers: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, layer);
        id
    }

    /// Markers of the given kind currently on the map
    pub fn markers(&self, kind: MarkerKind) -> Vec<LatLng> {
        self.layers
            .values()
            .filter_map(|layer| match layer {
                Layer::Marker { kind: k, at } if *k == kind => Some(*at),
                _ => None,
            })
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.layers
            .values()
            .filter(|layer| matches!(layer, Layer::Line { .. }))
            .count()
    }
}

impl MapSurface for HeadlessMap {
    fn place_marker(&mut self, kind: MarkerKind, at: LatLng) -> LayerId {
        self.insert(Layer::Marker { kind, at })
    }

    fn draw_line(&mut self, from: LatLng, to: LatLng, style: LineStyle) -> LayerId {
        self.insert(Layer::Line { from, to, style })
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.remove(&id);
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds, padding: u32) {
        self.viewport = Viewport::Fitted { bounds, padding };
    }

    fn set_tile_layer(&mut self, layer: TileLayer) {
        self.tile_layer = layer;
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.viewport = Viewport::Centered { center, zoom };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> LatLng {
        LatLng::new(51.5074, -0.1278)
    }

    #[test]
    fn test_layers_get_unique_ids() {
        let mut map = HeadlessMap::new(london(), 11);
        let a = map.place_marker(MarkerKind::Guess, london());
        let b = map.place_marker(MarkerKind::Truth, london());
        let c = map.draw_line(london(), london(), LineStyle::result_line());
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(map.layers.len(), 3);
        assert_eq!(map.line_count(), 1);
    }

    #[test]
    fn test_remove_layer() {
        let mut map = HeadlessMap::new(london(), 11);
        let id = map.place_marker(MarkerKind::Guess, london());
        map.remove_layer(id);
        assert!(map.markers(MarkerKind::Guess).is_empty());
        // Second removal is harmless
        map.remove_layer(id);
        assert!(map.layers.is_empty());
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut map = HeadlessMap::new(london(), 11);
        let first = map.place_marker(MarkerKind::Guess, london());
        map.remove_layer(first);
        let second = map.place_marker(MarkerKind::Guess, london());
        assert_ne!(first, second);
    }

    #[test]
    fn test_viewport_changes() {
        let mut map = HeadlessMap::new(london(), 11);
        let bounds = LatLngBounds::from_point(london());
        map.fit_bounds(bounds, 80);
        assert_eq!(map.viewport, Viewport::Fitted { bounds, padding: 80 });
        map.set_view(london(), 11);
        assert_eq!(map.viewport, Viewport::Centered { center: london(), zoom: 11 });
    }

    #[test]
    fn test_default_distance_is_haversine() {
        let map = HeadlessMap::new(london(), 11);
        let other = LatLng::new(51.5308, -0.1238);
        assert_eq!(map.distance_between(london(), other), haversine_distance(london(), other));
    }

    #[test]
    fn test_serialized_shape() {
        let mut map = HeadlessMap::new(london(), 11);
        map.set_tile_layer(TileLayer::Labeled);
        map.place_marker(MarkerKind::Truth, london());
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["tile_layer"], "labeled");
        assert_eq!(json["viewport"]["type"], "centered");
        assert_eq!(json["layers"]["1"]["type"], "marker");
        assert_eq!(json["layers"]["1"]["kind"], "truth");
    }
}
