//! Typed view of the viewer configuration object.
//!
//! Only the fields zoomprune acts on are typed. Everything else, at the top
//! level and inside each tileset, is captured in a flattened `extra` map and
//! written back untouched, so attributes added by the renderer survive a
//! rewrite.

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// One tileset entry: a world's output directory and its zoom depth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Output directory of the world's tile pyramid. Also its identifier.
    pub path: String,
    /// Deepest zoom level currently rendered for this world.
    #[serde(rename = "maxZoom", deserialize_with = "deserialize_depth")]
    pub max_zoom: u32,
    /// Attributes zoomprune does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl World {
    /// Create a world with no passthrough attributes.
    pub fn new(path: impl Into<String>, max_zoom: u32) -> Self {
        Self {
            path: path.into(),
            max_zoom,
            extra: Map::new(),
        }
    }

    /// Set the stored zoom depth.
    ///
    /// The depth is taken as a signed value so that the result of a
    /// subtraction can be handed over directly; negative depths are
    /// rejected.
    pub fn set_max_zoom(&mut self, depth: i64) -> Result<()> {
        self.max_zoom = u32::try_from(depth).map_err(|_| ConfigError::InvalidDepth(depth))?;
        Ok(())
    }
}

/// Accept a zoom depth written as an integer or as an integral float such
/// as `5.0`. Fractional, negative and out-of-range values are rejected.
fn deserialize_depth<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    struct DepthVisitor;

    impl Visitor<'_> for DepthVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative whole zoom depth")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<u32, E> {
            if v.is_finite() && v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
                Ok(v as u32)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(DepthVisitor)
}

/// The decoded configuration object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Worlds in the order the renderer wrote them.
    pub tilesets: Vec<World>,
    /// Top-level attributes zoomprune does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Configuration {
    /// Create a configuration holding the given worlds.
    pub fn new(tilesets: Vec<World>) -> Self {
        Self {
            tilesets,
            extra: Map::new(),
        }
    }

    /// Check that every world path is unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for world in &self.tilesets {
            if !seen.insert(world.path.as_str()) {
                return Err(ConfigError::DuplicateWorld(world.path.clone()));
            }
        }
        Ok(())
    }

    /// All worlds, in stored order.
    pub fn worlds(&self) -> &[World] {
        &self.tilesets
    }

    /// Look up a world by exact path.
    pub fn world(&self, path: &str) -> Result<&World> {
        self.tilesets
            .iter()
            .find(|w| w.path == path)
            .ok_or_else(|| ConfigError::WorldNotFound(path.to_string()))
    }

    /// Look up a world by exact path for mutation.
    pub fn world_mut(&mut self, path: &str) -> Result<&mut World> {
        self.tilesets
            .iter_mut()
            .find(|w| w.path == path)
            .ok_or_else(|| ConfigError::WorldNotFound(path.to_string()))
    }

    /// Set the zoom depth of the world at `path`.
    pub fn set_max_zoom(&mut self, path: &str, depth: i64) -> Result<()> {
        self.world_mut(path)?.set_max_zoom(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Configuration {
        serde_json::from_value(json!({
            "worlds": {"overworld": "World"},
            "tilesets": [
                {"path": "overworld-day", "maxZoom": 5, "name": "Day", "bgcolor": "#1a1a1a"},
                {"path": "nether", "maxZoom": 3, "showlocationmarker": true}
            ],
            "map": {"center": [-314, 67, 94]}
        }))
        .unwrap()
    }

    #[test]
    fn decodes_typed_fields() {
        let config = sample();
        assert_eq!(config.worlds().len(), 2);
        assert_eq!(config.worlds()[0].path, "overworld-day");
        assert_eq!(config.worlds()[0].max_zoom, 5);
        assert_eq!(config.worlds()[1].max_zoom, 3);
    }

    #[test]
    fn keeps_unknown_attributes() {
        let config = sample();
        assert_eq!(config.extra["map"], json!({"center": [-314, 67, 94]}));
        assert!(config.extra.contains_key("worlds"));
        assert!(!config.extra.contains_key("tilesets"));

        let day = config.world("overworld-day").unwrap();
        assert_eq!(day.extra["name"], json!("Day"));
        assert!(!day.extra.contains_key("maxZoom"));
    }

    #[test]
    fn reencodes_to_same_value() {
        let config = sample();
        let value = serde_json::to_value(&config).unwrap();
        let decoded: Configuration = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn world_lookup_is_exact() {
        let config = sample();
        assert!(config.world("nether").is_ok());
        assert!(matches!(
            config.world("nether/"),
            Err(ConfigError::WorldNotFound(p)) if p == "nether/"
        ));
        assert!(config.world("Nether").is_err());
    }

    #[test]
    fn set_max_zoom_updates_world() {
        let mut config = sample();
        config.set_max_zoom("overworld-day", 3).unwrap();
        assert_eq!(config.world("overworld-day").unwrap().max_zoom, 3);
        // Other worlds are untouched.
        assert_eq!(config.world("nether").unwrap().max_zoom, 3);
    }

    #[test]
    fn set_max_zoom_rejects_negative() {
        let mut config = sample();
        let err = config.set_max_zoom("nether", -1).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDepth(-1)));
        assert_eq!(config.world("nether").unwrap().max_zoom, 3);
    }

    #[test]
    fn set_max_zoom_on_unknown_world() {
        let mut config = sample();
        assert!(matches!(
            config.set_max_zoom("end", 1),
            Err(ConfigError::WorldNotFound(_))
        ));
    }

    #[test]
    fn validate_rejects_duplicate_paths() {
        let config = Configuration::new(vec![World::new("a", 1), World::new("a", 2)]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateWorld(p)) if p == "a"
        ));
    }

    #[test]
    fn missing_max_zoom_fails_to_decode() {
        let result: std::result::Result<Configuration, _> =
            serde_json::from_value(json!({"tilesets": [{"path": "a"}]}));
        assert!(result.is_err());
    }

    #[test]
    fn negative_max_zoom_fails_to_decode() {
        let result: std::result::Result<Configuration, _> =
            serde_json::from_value(json!({"tilesets": [{"path": "a", "maxZoom": -2}]}));
        assert!(result.is_err());
    }

    #[test]
    fn integral_float_max_zoom_decodes() {
        let config: Configuration =
            serde_json::from_str(r#"{"tilesets": [{"path": "a", "maxZoom": 5.0}]}"#).unwrap();
        assert_eq!(config.world("a").unwrap().max_zoom, 5);
        assert_eq!(serde_json::to_value(&config).unwrap()["tilesets"][0]["maxZoom"], json!(5));
    }

    #[test]
    fn fractional_max_zoom_fails_to_decode() {
        let result: std::result::Result<Configuration, _> =
            serde_json::from_str(r#"{"tilesets": [{"path": "a", "maxZoom": 5.5}]}"#);
        assert!(result.is_err());
        let result: std::result::Result<Configuration, _> =
            serde_json::from_str(r#"{"tilesets": [{"path": "a", "maxZoom": -2.0}]}"#);
        assert!(result.is_err());
    }
}
