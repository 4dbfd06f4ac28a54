//! Server configuration loaded from TOML, with command-line overrides
//! applied by the binary.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default listen address.
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);

/// Server settings.
///
/// ```toml
/// listen = "0.0.0.0:3000"
/// max_history = 10000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
	/// Address the TCP listener binds to.
	pub listen: SocketAddr,
	/// Operations each session keeps for transforming late arrivals.
	/// Unbounded when unset.
	pub max_history: Option<usize>,
	/// Depth of the registry actor's command queue.
	pub mailbox_capacity: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			listen: DEFAULT_LISTEN,
			max_history: None,
			mailbox_capacity: 256,
		}
	}
}

impl ServerConfig {
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

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_file_uses_defaults() {
		assert_eq!(ServerConfig::from_toml_str("").unwrap(), ServerConfig::default());
		assert_eq!(ServerConfig::default().listen.to_string(), "127.0.0.1:3000");
	}

	#[test]
	fn keys_override_defaults() {
		let config = ServerConfig::from_toml_str("listen = \"0.0.0.0:4000\"\nmax_history = 10\n").unwrap();
		assert_eq!(config.listen.port(), 4000);
		assert_eq!(config.max_history, Some(10));
		assert_eq!(config.mailbox_capacity, 256);
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(
			ServerConfig::from_toml_str("port = 1"),
			Err(ConfigError::Toml(_))
		));
	}

	#[test]
	fn missing_file_reports_path() {
		let err = ServerConfig::load(Path::new("/nonexistent/tandem.toml")).unwrap_err();
		assert!(err.to_string().contains("/nonexistent/tandem.toml"));
	}
}
