//! Builder for constructing an order service from configuration.
//!
//! The storage backend is chosen by name from `[storage] primary` and created
//! with the matching factory, so the binary decides which backends exist and
//! configuration decides which one is used.

use crate::OrderService;
use pizza_config::Config;
use pizza_storage::{OrderStore, StorageError, StorageInterface};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during order service construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Builder for an [`OrderService`] with a pluggable storage backend.
pub struct OrderServiceBuilder {
	config: Config,
}

impl OrderServiceBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the service using the factory registered for the primary
	/// storage implementation.
	pub fn build<SF>(
		self,
		storage_factories: &HashMap<String, SF>,
	) -> Result<OrderService, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let primary = &self.config.storage.primary;

		let factory = storage_factories.get(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"No storage implementation registered as '{}'",
				primary
			))
		})?;
		let backend_config = self.config.primary_storage().ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' not found in implementations",
				primary
			))
		})?;

		let backend = factory(backend_config).map_err(|e| {
			tracing::error!(
				component = "storage",
				implementation = %primary,
				error = %e,
				"Failed to create storage implementation"
			);
			BuilderError::Config(format!(
				"Failed to create storage implementation '{}': {}",
				primary, e
			))
		})?;
		tracing::debug!(component = "storage", implementation = %primary, "Loaded");

		Ok(OrderService::with_policy(
			OrderStore::new(backend),
			self.config.storage.on_corrupt,
		))
	}
}
