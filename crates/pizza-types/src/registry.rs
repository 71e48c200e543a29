//! Registry trait for self-registering implementations.
//!
//! Storage backends declare the name they are referenced by in configuration
//! together with the factory that builds them.

/// Base trait for implementation registries.
///
/// Each backend module provides a `Registry` struct implementing this trait,
/// so the name used under `[storage.implementations.<name>]` and the factory
/// function always travel together.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// for example "file" for `storage.implementations.file`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
