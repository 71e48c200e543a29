//! Common types module for the pizza order tracker.
//!
//! This module defines the order record and the closed catalogs (sizes,
//! toppings, statuses) shared by the storage, core and CLI crates, along
//! with the configuration-schema helpers used by storage backends.

/// Order record, catalogs, pricing and the status progression.
pub mod order;
/// Registry trait for self-registering backend implementations.
pub mod registry;
/// Storage policy types shared by configuration and the order service.
pub mod storage;
/// Formatting helpers for presenting orders.
pub mod utils;
/// Configuration validation types for backend configuration tables.
pub mod validation;

pub use order::*;
pub use registry::ImplementationRegistry;
pub use storage::*;
pub use utils::{format_price, truncate_id};
pub use validation::*;
