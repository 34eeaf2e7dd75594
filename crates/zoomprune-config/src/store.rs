//! Loading and persisting the viewer configuration file.
//!
//! On-disk format:
//! ```text
//! var overviewerConfig = {"tilesets": [{"path": "...", "maxZoom": 5, ...}], ...}
//! ```
//! Anything before the first `{` is treated as prefix and anything after the
//! end of the object is ignored. On write the fixed [`CONFIG_PREFIX`] is
//! emitted, followed by the object and a newline.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::model::{Configuration, World};

/// File name the renderer writes into its output directory.
pub const DEFAULT_CONFIG_FILE: &str = "overviewerConfig.js";

/// Text written ahead of the JSON object.
pub const CONFIG_PREFIX: &str = "var overviewerConfig = ";

/// Handle on a configuration file.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl ConfigStore {
    /// Create a store for the file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the configuration file.
    pub fn load(&self) -> Result<Configuration> {
        let text = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let config = self.decode(&text)?;
        debug!(
            path = %self.path.display(),
            worlds = config.tilesets.len(),
            "config loaded"
        );
        Ok(config)
    }

    /// Encode `config` and replace the configuration file with it.
    ///
    /// The new content is written to a temporary file next to the target and
    /// renamed over it, so readers see either the old or the new file.
    pub fn persist(&self, config: &Configuration) -> Result<()> {
        config.validate()?;
        let body = serde_json::to_string(config)?;

        let write_err = |source: io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        file.write_all(CONFIG_PREFIX.as_bytes()).map_err(write_err)?;
        file.write_all(body.as_bytes()).map_err(write_err)?;
        file.write_all(b"\n").map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;

        // Keep the mode of the file being replaced; temp files are private.
        if let Ok(meta) = fs::metadata(&self.path) {
            fs::set_permissions(file.path(), meta.permissions()).map_err(write_err)?;
        }

        file.persist(&self.path).map_err(|e| write_err(e.error))?;
        debug!(path = %self.path.display(), bytes = body.len(), "config persisted");
        Ok(())
    }

    /// Directory holding the tiles of `world`.
    ///
    /// Relative world paths are relative to the directory of the
    /// configuration file.
    pub fn resolve_world_root(&self, world: &World) -> PathBuf {
        let path = Path::new(&world.path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.path.parent() {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    fn decode(&self, text: &str) -> Result<Configuration> {
        let start = text
            .find('{')
            .ok_or_else(|| ConfigError::MissingObject(self.path.clone()))?;

        // Only the first object is read; trailing text such as `;` is ignored.
        let mut de = serde_json::Deserializer::from_str(&text[start..]);
        let config = Configuration::deserialize(&mut de).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const SAMPLE: &str = r##"var overviewerConfig = {"worlds": {"survival": "Survival"}, "tilesets": [{"path": "survival-day", "maxZoom": 5, "name": "Day", "spawn": [0, 64, 0]}, {"path": "survival-night", "maxZoom": 4, "bgcolor": "#000"}], "CONST": {"tileSize": 384}};"##;

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    fn json_body(text: &str) -> Value {
        let start = text.find('{').unwrap();
        let mut de = serde_json::Deserializer::from_str(&text[start..]);
        Value::deserialize(&mut de).unwrap()
    }

    #[test]
    fn load_skips_prefix_and_trailer() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(write_sample(dir.path()));

        let config = store.load().unwrap();
        assert_eq!(config.worlds().len(), 2);
        assert_eq!(config.world("survival-day").unwrap().max_zoom, 5);
        assert_eq!(config.world("survival-night").unwrap().max_zoom, 4);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("absent.js"));
        assert!(matches!(store.load(), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn load_without_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.js");
        fs::write(&path, "var overviewerConfig = null;").unwrap();
        let store = ConfigStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::MissingObject(_))));
    }

    #[test]
    fn load_malformed_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.js");
        fs::write(&path, "var overviewerConfig = {\"tilesets\": [{\"path\": ").unwrap();
        let store = ConfigStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_without_tilesets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.js");
        fs::write(&path, "var overviewerConfig = {\"worlds\": {}};").unwrap();
        let store = ConfigStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_rejects_duplicate_worlds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.js");
        fs::write(
            &path,
            r#"var overviewerConfig = {"tilesets": [{"path": "a", "maxZoom": 1}, {"path": "a", "maxZoom": 2}]}"#,
        )
        .unwrap();
        let store = ConfigStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::DuplicateWorld(_))));
    }

    #[test]
    fn persist_roundtrip_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(write_sample(dir.path()));

        let config = store.load().unwrap();
        store.persist(&config).unwrap();

        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.starts_with(CONFIG_PREFIX));
        assert!(written.ends_with("}\n"));
        assert_eq!(json_body(&written), json_body(SAMPLE));
    }

    #[test]
    fn persist_keeps_world_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(write_sample(dir.path()));
        store.persist(&store.load().unwrap()).unwrap();

        let body = json_body(&fs::read_to_string(store.path()).unwrap());
        let paths: Vec<&str> = body["tilesets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, ["survival-day", "survival-night"]);
    }

    #[test]
    fn persist_writes_new_depth() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(write_sample(dir.path()));

        let mut config = store.load().unwrap();
        config.set_max_zoom("survival-day", 3).unwrap();
        store.persist(&config).unwrap();

        let body = json_body(&fs::read_to_string(store.path()).unwrap());
        assert_eq!(body["tilesets"][0]["maxZoom"], json!(3));
        assert_eq!(body["tilesets"][0]["name"], json!("Day"));
        assert_eq!(body["tilesets"][1]["maxZoom"], json!(4));
        assert_eq!(body["CONST"], json!({"tileSize": 384}));

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn persist_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("fresh.js"));
        let config = Configuration::new(vec![World::new("w", 2)]);

        store.persist(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn persist_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("gone").join("config.js"));
        let config = Configuration::new(vec![World::new("w", 2)]);

        assert!(matches!(store.persist(&config), Err(ConfigError::Write { .. })));
    }

    #[test]
    fn resolve_relative_world_against_config_dir() {
        let store = ConfigStore::new("/srv/map/overviewerConfig.js");
        let world = World::new("survival-day", 5);
        assert_eq!(
            store.resolve_world_root(&world),
            PathBuf::from("/srv/map/survival-day")
        );
    }

    #[test]
    fn resolve_absolute_world_unchanged() {
        let store = ConfigStore::new("/srv/map/overviewerConfig.js");
        let world = World::new("/worlds/overworld", 5);
        assert_eq!(
            store.resolve_world_root(&world),
            PathBuf::from("/worlds/overworld")
        );
    }

    #[test]
    fn resolve_with_bare_config_name() {
        let store = ConfigStore::default();
        let world = World::new("survival-day", 5);
        assert_eq!(store.resolve_world_root(&world), PathBuf::from("survival-day"));
    }
}
