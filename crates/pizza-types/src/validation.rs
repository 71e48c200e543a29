//! Configuration validation utilities for backend configuration tables.
//!
//! Each storage backend receives its own `[storage.implementations.<name>]`
//! table as a raw TOML value. A [`Schema`] describes which keys that table may
//! carry and their types, so typos and wrong types are caught when the backend
//! is built rather than silently ignored.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum SchemaError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	/// Error that occurs when a key is not part of the schema.
	#[error("Unknown field: {0}")]
	UnknownField(String),
}

/// Represents the type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	String,
}

impl FieldType {
	fn name(&self) -> &'static str {
		match self {
			FieldType::String => "string",
		}
	}

	fn matches(&self, value: &toml::Value) -> bool {
		match self {
			FieldType::String => value.is_str(),
		}
	}
}

/// Type alias for field validator functions.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named, typed field with an optional custom validator.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator run after the type check succeeds.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), SchemaError> {
		if !self.field_type.matches(value) {
			return Err(SchemaError::TypeMismatch {
				field: self.name.clone(),
				expected: self.field_type.name().to_string(),
				actual: value.type_str().to_string(),
			});
		}
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| SchemaError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Validation schema for a flat TOML table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// # Errors
	///
	/// Returns an error if the value is not a table, a required field is
	/// missing, a field has the wrong type or fails its validator, or the
	/// table carries a key the schema does not know.
	pub fn validate(&self, config: &toml::Value) -> Result<(), SchemaError> {
		let table = config
			.as_table()
			.ok_or_else(|| SchemaError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| SchemaError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		for key in table.keys() {
			let known = self
				.required
				.iter()
				.chain(self.optional.iter())
				.any(|field| &field.name == key);
			if !known {
				return Err(SchemaError::UnknownField(key.clone()));
			}
		}

		Ok(())
	}
}

/// Trait implemented by each backend's configuration schema.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), SchemaError>;
}
