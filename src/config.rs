//! # Editor Configuration
//!
//! Parses `editor.toml`, the declarative settings for a session: where the
//! map opens, which origin the overlay projection is anchored at, how clicks
//! on the empty map behave, and the selectable base-map styles.
//!
//! Every field has a default, so an empty document is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geodesy::LngLat;

/// Config bundled with the app.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../assets/editor.toml");

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
	/// Initial view.
	#[serde(default)]
	pub map: MapConfig,
	/// Reference origin for overlay georeferencing.
	#[serde(default)]
	pub projection: ProjectionConfig,
	/// Editing behavior.
	#[serde(default)]
	pub editor: EditingConfig,
	/// Base-map styles; the first one is selected at startup.
	#[serde(default = "default_basemaps")]
	pub basemaps: Vec<BaseMapStyle>,
}

impl EditorConfig {
	/// Parse a TOML document.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	/// The bundled config, falling back to built-in defaults if it fails to
	/// parse.
	pub fn bundled() -> Self {
		Self::from_toml_str(DEFAULT_CONFIG_TOML).unwrap_or_else(|err| {
			log::warn!("bundled editor.toml rejected, using defaults: {err}");
			Self::default()
		})
	}

	/// Style by name, or the first configured one.
	pub fn basemap(&self, name: &str) -> Option<&BaseMapStyle> {
		self.basemaps
			.iter()
			.find(|s| s.name == name)
			.or_else(|| self.basemaps.first())
	}
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			map: MapConfig::default(),
			projection: ProjectionConfig::default(),
			editor: EditingConfig::default(),
			basemaps: default_basemaps(),
		}
	}
}

/// Initial map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
	/// Longitude the map opens at.
	#[serde(default = "default_center_lng")]
	pub center_lng: f64,
	/// Latitude the map opens at.
	#[serde(default = "default_center_lat")]
	pub center_lat: f64,
	/// Web-Mercator zoom level the map opens at.
	#[serde(default = "default_zoom")]
	pub zoom: f64,
	/// Pick radius around nodes and edges, in screen pixels.
	#[serde(default = "default_hit_radius")]
	pub hit_radius_px: f64,
}

impl MapConfig {
	/// Initial centre as a position.
	pub fn center(&self) -> LngLat {
		LngLat::new(self.center_lng, self.center_lat)
	}
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			center_lng: default_center_lng(),
			center_lat: default_center_lat(),
			zoom: default_zoom(),
			hit_radius_px: default_hit_radius(),
		}
	}
}

fn default_center_lng() -> f64 {
	139.7
}
fn default_center_lat() -> f64 {
	35.7
}
fn default_zoom() -> f64 {
	12.0
}
fn default_hit_radius() -> f64 {
	8.0
}

/// Projection origin used by the overlay georeferencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
	/// Origin longitude, degrees.
	#[serde(default = "default_origin_lng")]
	pub origin_lng: f64,
	/// Origin latitude, degrees.
	#[serde(default = "default_origin_lat")]
	pub origin_lat: f64,
}

impl ProjectionConfig {
	/// Origin as a position.
	pub fn origin(&self) -> LngLat {
		LngLat::new(self.origin_lng, self.origin_lat)
	}
}

impl Default for ProjectionConfig {
	fn default() -> Self {
		Self {
			origin_lng: default_origin_lng(),
			origin_lat: default_origin_lat(),
		}
	}
}

// Zone IX of the Japanese plane rectangular coordinate system.
fn default_origin_lng() -> f64 {
	139.0 + 50.0 / 60.0
}
fn default_origin_lat() -> f64 {
	36.0
}

/// What a click on the empty map does while no edge is pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickMode {
	/// Place a node and start drawing an edge from it.
	#[default]
	Chain,
	/// Place a node and stay idle.
	PlaceOnly,
}

/// Editing behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditingConfig {
	/// Idle-click behavior.
	#[serde(default)]
	pub click_mode: ClickMode,
}

/// A named base-map look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseMapStyle {
	/// Display name.
	pub name: String,
	/// Canvas background color.
	pub background: String,
	/// Graticule line color.
	pub grid: String,
}

impl Default for BaseMapStyle {
	fn default() -> Self {
		Self {
			name: "Light".into(),
			background: "#f4f4f0".into(),
			grid: "rgba(0, 0, 0, 0.08)".into(),
		}
	}
}

fn default_basemaps() -> Vec<BaseMapStyle> {
	vec![BaseMapStyle::default()]
}
