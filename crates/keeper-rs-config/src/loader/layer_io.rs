//! IO helpers for reading config layers from disk.

use super::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_FILE, LoadedLayer, SYSTEM_CONFIG_PATH, schema,
};
use crate::{ConfigError, KEEPER_HOME_DIR};
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read, parse and validate one layer.
pub(super) fn load_layer(source: ConfigLayerSource, path: &Path) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "loading config layer (source={}, path={})",
        source.label(),
        path.display()
    );
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    schema::validate_layer_schema(&value, &layer_label(source, path))?;
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
        },
        value,
    })
}

/// Label used to prefix schema validation errors.
pub(super) fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    format!("{}({})", source.label(), path.display())
}

pub(super) fn default_system_config_path() -> Option<PathBuf> {
    #[cfg(any(unix, windows))]
    {
        Some(PathBuf::from(SYSTEM_CONFIG_PATH))
    }
    #[cfg(not(any(unix, windows)))]
    {
        None
    }
}

/// `~/.keeper/keeper.json5`, when a home directory is known.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(KEEPER_HOME_DIR).join(DEFAULT_CONFIG_FILE))
}
