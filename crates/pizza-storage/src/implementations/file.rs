//! File-based storage backend.
//!
//! Each key is stored as a pretty-printed JSON document at
//! `<storage_path>/<key>.json`, so the order collection lives in
//! `data/orders.json` by default.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use pizza_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SchemaError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Directory used when `storage_path` is not configured.
pub const DEFAULT_STORAGE_PATH: &str = "./data";

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	pub fn new(base_path: impl Into<PathBuf>) -> Self {
		Self {
			base_path: base_path.into(),
		}
	}

	/// Converts a storage key to a filesystem-safe file path.
	pub fn file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', '\\', ':'], "_");
		self.base_path.join(format!("{}.json", safe_key))
	}
}

impl StorageInterface for FileStorage {
	fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);

		match fs::read(&path) {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Io(e)),
		}
	}

	fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("json.tmp");
		let result = (|| {
			let mut file = fs::File::create(&temp_path)?;
			file.write_all(&value)?;
			file.sync_all()?;
			fs::rename(&temp_path, &path)
		})();

		if let Err(e) = result {
			if let Err(cleanup) = fs::remove_file(&temp_path) {
				if cleanup.kind() != ErrorKind::NotFound {
					tracing::warn!(
						"Failed to remove temporary file {:?}: {}",
						temp_path,
						cleanup
					);
				}
			}
			return Err(StorageError::Io(e));
		}

		tracing::trace!(path = %path.display(), bytes = value.len(), "Wrote document");
		Ok(())
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("storage_path", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(path) if !path.trim().is_empty() => Ok(()),
					_ => Err("storage_path cannot be empty".to_string()),
				}
			})],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Directory holding the data files (default: "./data")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema.validate(config)?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Ok(Box::new(FileStorage::new(storage_path)))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{OrderStore, ORDERS_KEY};
	use pizza_types::{Order, PizzaSize, Topping};
	use tempfile::TempDir;

	#[test]
	fn test_missing_file_is_not_found() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path());

		assert!(matches!(
			storage.read(ORDERS_KEY),
			Err(StorageError::NotFound)
		));
		assert!(!storage.file_path(ORDERS_KEY).exists());
	}

	#[test]
	fn test_write_creates_directories() {
		let temp_dir = TempDir::new().unwrap();
		let base = temp_dir.path().join("nested").join("data");
		let storage = FileStorage::new(&base);

		storage.write(ORDERS_KEY, b"[]".to_vec()).unwrap();

		assert_eq!(fs::read(base.join("orders.json")).unwrap(), b"[]");
		assert_eq!(storage.file_path(ORDERS_KEY), base.join("orders.json"));
	}

	#[test]
	fn test_write_leaves_no_temp_file() {
		let temp_dir = TempDir::new().unwrap();
		let storage = FileStorage::new(temp_dir.path());

		storage.write(ORDERS_KEY, b"[1]".to_vec()).unwrap();
		storage.write(ORDERS_KEY, b"[2]".to_vec()).unwrap();

		let names: Vec<String> = fs::read_dir(temp_dir.path())
			.unwrap()
			.map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
			.collect();
		assert_eq!(names, vec!["orders.json".to_string()]);
		assert_eq!(storage.read(ORDERS_KEY).unwrap(), b"[2]".to_vec());
	}

	#[test]
	fn test_order_store_on_disk() {
		let temp_dir = TempDir::new().unwrap();
		let store = OrderStore::new(Box::new(FileStorage::new(temp_dir.path())));
		assert!(store.load_all().unwrap().is_empty());

		let orders = vec![Order::new(
			"Alice",
			PizzaSize::Large,
			vec![Topping::Sausage, Topping::Onions],
		)
		.unwrap()];
		store.save_all(&orders).unwrap();

		let text = fs::read_to_string(temp_dir.path().join("orders.json")).unwrap();
		assert!(text.starts_with("[\n  {"));
		assert!(text.contains("\"customer_name\": \"Alice\""));
		assert_eq!(store.load_all().unwrap(), orders);
	}

	#[test]
	fn test_corrupt_file_surfaces() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("orders.json"), "{ broken").unwrap();

		let store = OrderStore::new(Box::new(FileStorage::new(temp_dir.path())));
		assert!(matches!(store.load_all(), Err(StorageError::Corrupt(_))));
	}

	#[test]
	fn test_unwritable_path_is_io_error() {
		let temp_dir = TempDir::new().unwrap();
		let blocker = temp_dir.path().join("blocker");
		fs::write(&blocker, "not a directory").unwrap();

		let storage = FileStorage::new(blocker.join("data"));
		assert!(matches!(
			storage.write(ORDERS_KEY, b"[]".to_vec()),
			Err(StorageError::Io(_))
		));
	}

	#[test]
	fn test_factory_uses_configured_path() {
		let temp_dir = TempDir::new().unwrap();
		let mut table = toml::map::Map::new();
		table.insert(
			"storage_path".to_string(),
			toml::Value::String(temp_dir.path().to_string_lossy().into_owned()),
		);

		let storage = create_storage(&toml::Value::Table(table)).unwrap();
		storage.write(ORDERS_KEY, b"[]".to_vec()).unwrap();

		assert!(temp_dir.path().join("orders.json").exists());
	}

	#[test]
	fn test_factory_rejects_empty_path() {
		let config: toml::Value = toml::from_str(r#"storage_path = """#).unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));
	}
}
