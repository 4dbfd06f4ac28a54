//! Client configuration loaded from TOML.

use std::path::Path;

use serde::Deserialize;
use tandem_editor_core::DEFAULT_MAX_ITEMS;

use crate::error::ConfigError;

/// Client settings.
///
/// ```toml
/// max_undo_items = 100
///
/// [color]
/// saturation = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
	/// Bound on each of the undo and redo stacks.
	pub max_undo_items: usize,
	/// Shades used for remote participants.
	pub color: ColorConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			max_undo_items: DEFAULT_MAX_ITEMS,
			color: ColorConfig::default(),
		}
	}
}

impl ClientConfig {
	/// Parses configuration from TOML text. Missing keys take their defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses a configuration file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}
}

/// HSL parameters for participant colours; the hue comes from the name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
	/// Saturation of the cursor shade.
	pub saturation: f64,
	/// Lightness of the cursor shade.
	pub lightness: f64,
	/// Saturation of the selection shade.
	pub light_saturation: f64,
	/// Lightness of the selection shade.
	pub light_lightness: f64,
}

impl Default for ColorConfig {
	fn default() -> Self {
		Self {
			saturation: 0.75,
			lightness: 0.5,
			light_saturation: 0.5,
			light_lightness: 0.9,
		}
	}
}
