//! Storage module for the pizza order tracker.
//!
//! Orders are persisted as one JSON array document. This crate separates the
//! raw document backends (file-based, in-memory) from the typed [`OrderStore`]
//! that encodes and decodes the full order collection on every load and save.

use pizza_types::{ImplementationRegistry, Order, SchemaError};
use std::collections::HashSet;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Key under which the order collection is stored.
pub const ORDERS_KEY: &str = "orders";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The requested document does not exist.
	#[error("Not found")]
	NotFound,
	/// The document exists but does not decode as an order collection.
	#[error("Corrupt store: {0}")]
	Corrupt(String),
	/// The order collection could not be encoded.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Reading or writing the backing file failed.
	#[error("Storage I/O error: {0}")]
	Io(#[from] std::io::Error),
	/// The backend configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl From<SchemaError> for StorageError {
	fn from(err: SchemaError) -> Self {
		StorageError::Configuration(err.to_string())
	}
}

/// Trait defining the low-level interface for storage backends.
///
/// Backends hold whole documents addressed by key. Writes replace the
/// previous document entirely.
pub trait StorageInterface: Send + Sync {
	/// Reads the raw bytes stored under `key`.
	///
	/// Returns [`StorageError::NotFound`] if nothing has been written yet.
	fn read(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Replaces the document stored under `key`.
	fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;
}

/// Type alias for storage factory functions.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Typed store for the full order collection.
///
/// Every load decodes the whole array and every save rewrites it. There are
/// no partial or per-record writes.
pub struct OrderStore {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl OrderStore {
	/// Creates a new OrderStore with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Loads every persisted order, in the order they were saved.
	///
	/// A store that has never been written loads as empty.
	///
	/// # Errors
	///
	/// Returns [`StorageError::Corrupt`] if the document is not a valid JSON
	/// array of orders, if a record breaks an order rule (blank name,
	/// repeated topping, price not matching size and toppings), or if two
	/// records share an id. Returns [`StorageError::Io`] if it cannot be read.
	pub fn load_all(&self) -> Result<Vec<Order>, StorageError> {
		let bytes = match self.backend.read(ORDERS_KEY) {
			Ok(bytes) => bytes,
			Err(StorageError::NotFound) => {
				tracing::debug!("No order collection stored yet, starting empty");
				return Ok(Vec::new());
			},
			Err(e) => return Err(e),
		};

		let orders: Vec<Order> =
			serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt(e.to_string()))?;

		let mut ids = HashSet::with_capacity(orders.len());
		if let Some(order) = orders.iter().find(|order| !ids.insert(order.id())) {
			return Err(StorageError::Corrupt(format!(
				"duplicate order id '{}'",
				order.id()
			)));
		}

		tracing::debug!(count = orders.len(), "Loaded orders");
		Ok(orders)
	}

	/// Replaces the persisted collection with `orders`.
	pub fn save_all(&self, orders: &[Order]) -> Result<(), StorageError> {
		let mut bytes = serde_json::to_vec_pretty(orders)
			.map_err(|e| StorageError::Serialization(e.to_string()))?;
		bytes.push(b'\n');
		self.backend.write(ORDERS_KEY, bytes)?;
		tracing::debug!(count = orders.len(), "Saved orders");
		Ok(())
	}
}
