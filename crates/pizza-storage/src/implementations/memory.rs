//! In-memory storage backend implementation.
//!
//! Useful for tests and dry runs where nothing should touch the filesystem.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use pizza_types::{ConfigSchema, ImplementationRegistry, Schema, SchemaError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory storage implementation.
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStorage {
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StorageInterface for MemoryStorage {
	fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().unwrap_or_else(|e| e.into_inner());
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
		store.insert(key.to_string(), value);
		Ok(())
	}
}

/// Configuration schema for MemoryStorage.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		// Memory storage takes no configuration
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function to create a memory storage backend from configuration.
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	MemoryStorageSchema.validate(config)?;
	Ok(Box::new(MemoryStorage::new()))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}
