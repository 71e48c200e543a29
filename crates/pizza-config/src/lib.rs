//! Configuration module for the pizza order tracker.
//!
//! Configuration is read from a TOML file. Every section is optional; a
//! missing file or section falls back to storing orders in `./data/orders.json`.
//! String values may reference environment variables as `${VAR}` or
//! `${VAR:-default}`.

use pizza_types::CorruptStorePolicy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the tracker.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this tracker instance.
	#[serde(default)]
	pub tracker: TrackerConfig,
	/// Configuration for the storage backend.
	#[serde(default)]
	pub storage: StorageConfig,
}

/// Configuration specific to the tracker instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
	/// Name shown in logs.
	#[serde(default = "default_tracker_name")]
	pub name: String,
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			name: default_tracker_name(),
		}
	}
}

fn default_tracker_name() -> String {
	"pizza-tracker".to_string()
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	#[serde(default = "default_primary_storage")]
	pub primary: String,
	/// What to do when the stored collection cannot be decoded.
	#[serde(default)]
	pub on_corrupt: CorruptStorePolicy,
	/// Map of storage implementation names to their configurations.
	#[serde(default = "default_storage_implementations")]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			primary: default_primary_storage(),
			on_corrupt: CorruptStorePolicy::default(),
			implementations: default_storage_implementations(),
		}
	}
}

fn default_primary_storage() -> String {
	"file".to_string()
}

fn default_storage_implementations() -> HashMap<String, toml::Value> {
	HashMap::from([(
		default_primary_storage(),
		toml::Value::Table(toml::map::Map::new()),
	)])
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read configuration {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Points the file backend at `dir` and makes it the primary storage.
	pub fn with_storage_path(mut self, dir: impl AsRef<Path>) -> Self {
		let mut table = match self.storage.implementations.remove("file") {
			Some(toml::Value::Table(table)) => table,
			_ => toml::map::Map::new(),
		};
		table.insert(
			"storage_path".to_string(),
			toml::Value::String(dir.as_ref().to_string_lossy().into_owned()),
		);
		self.storage
			.implementations
			.insert("file".to_string(), toml::Value::Table(table));
		self.storage.primary = "file".to_string();
		self
	}

	/// Returns the configuration table of the primary storage implementation.
	pub fn primary_storage(&self) -> Option<&toml::Value> {
		self.storage.implementations.get(&self.storage.primary)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.tracker.name.trim().is_empty() {
			return Err(ConfigError::Validation(
				"Tracker name cannot be empty".into(),
			));
		}

		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn test_empty_config_uses_defaults() {
		let config: Config = "".parse().unwrap();

		assert_eq!(config.tracker.name, "pizza-tracker");
		assert_eq!(config.storage.primary, "file");
		assert_eq!(config.storage.on_corrupt, CorruptStorePolicy::Fail);
		assert!(config.primary_storage().is_some());
	}

	#[test]
	fn test_full_config() {
		let config: Config = r#"
[tracker]
name = "downtown"

[storage]
primary = "memory"
on_corrupt = "treat_as_empty"

[storage.implementations.memory]

[storage.implementations.file]
storage_path = "/var/lib/pizza"
"#
		.parse()
		.unwrap();

		assert_eq!(config.tracker.name, "downtown");
		assert_eq!(config.storage.primary, "memory");
		assert_eq!(
			config.storage.on_corrupt,
			CorruptStorePolicy::TreatAsEmpty
		);
		assert_eq!(config.storage.implementations.len(), 2);
		assert_eq!(
			config.storage.implementations["file"]
				.get("storage_path")
				.and_then(|v| v.as_str()),
			Some("/var/lib/pizza")
		);
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let result: Result<Config, _> = r#"
[storage]
primary = "redis"
"#
		.parse();

		let err = result.unwrap_err();
		assert!(err
			.to_string()
			.contains("Primary storage 'redis' not found in implementations"));
	}

	#[test]
	fn test_unknown_policy_rejected() {
		let result: Result<Config, _> = r#"
[storage]
on_corrupt = "shrug"
"#
		.parse();

		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}

	#[test]
	fn test_env_var_default_value() {
		let resolved =
			resolve_env_vars(r#"storage_path = "${PIZZA_CONFIG_TEST_UNSET_VAR:-data/shop}""#)
				.unwrap();
		assert_eq!(resolved, r#"storage_path = "data/shop""#);
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("PIZZA_CONFIG_TEST_NAME", "uptown");
		let config: Config = r#"
[tracker]
name = "${PIZZA_CONFIG_TEST_NAME}"
"#
		.parse()
		.unwrap();
		assert_eq!(config.tracker.name, "uptown");
	}

	#[test]
	fn test_missing_env_var() {
		let err = resolve_env_vars("name = \"${PIZZA_CONFIG_TEST_MISSING_VAR}\"").unwrap_err();
		assert!(err.to_string().contains("PIZZA_CONFIG_TEST_MISSING_VAR"));
	}

	#[test]
	fn test_from_file() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("pizza.toml");
		fs::write(
			&config_path,
			r#"
[tracker]
name = "file-test"
"#,
		)
		.unwrap();

		let config = Config::from_file(&config_path).unwrap();
		assert_eq!(config.tracker.name, "file-test");

		let missing = Config::from_file(temp_dir.path().join("absent.toml"));
		assert!(matches!(missing, Err(ConfigError::Io(_))));
	}

	#[test]
	fn test_with_storage_path() {
		let config: Config = r#"
[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse::<Config>()
		.unwrap()
		.with_storage_path("/tmp/orders");

		assert_eq!(config.storage.primary, "file");
		assert_eq!(
			config
				.primary_storage()
				.and_then(|v| v.get("storage_path"))
				.and_then(|v| v.as_str()),
			Some("/tmp/orders")
		);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_empty_tracker_name_rejected() {
		let result: Result<Config, _> = "[tracker]\nname = \"  \"\n".parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}
}
