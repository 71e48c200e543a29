//! Order types for the pizza tracker.
//!
//! This module defines the order record together with the fixed catalogs it
//! draws from: pizza sizes with their base prices, the topping catalog, and
//! the forward-only status progression pending -> preparing -> ready -> delivered.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Number of decimal places prices are rounded to.
pub const PRICE_SCALE: u32 = 2;

/// Flat surcharge applied per topping, regardless of which topping it is.
pub fn topping_price() -> Decimal {
	Decimal::new(150, PRICE_SCALE)
}

/// Errors raised when order input fails a domain rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// The customer name is empty or whitespace only.
	#[error("Customer name cannot be empty")]
	EmptyName,
	/// The requested size is not one of small, medium or large.
	#[error("Invalid size '{0}'")]
	InvalidSize(String),
	/// The requested topping is not in the catalog.
	#[error("Invalid topping '{0}'")]
	InvalidTopping(String),
	/// The same topping was selected more than once.
	#[error("Topping '{0}' selected more than once")]
	DuplicateTopping(String),
	/// The requested status is not a known order status.
	#[error("Invalid status '{0}'")]
	InvalidStatus(String),
	/// A stored order has no id.
	#[error("Order id cannot be empty")]
	EmptyId,
	/// A stored customer name carries leading or trailing whitespace.
	#[error("Customer name '{0}' is not trimmed")]
	UntrimmedName(String),
	/// A stored price does not match the price derived from size and toppings.
	#[error("Price {actual} does not match the expected price {expected}")]
	PriceMismatch { expected: Decimal, actual: Decimal },
}

/// Available pizza sizes, each with a fixed base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PizzaSize {
	Small,
	Medium,
	Large,
}

impl PizzaSize {
	/// Every size, in menu order.
	pub const ALL: [PizzaSize; 3] = [PizzaSize::Small, PizzaSize::Medium, PizzaSize::Large];

	/// Returns the name used in the data file and on the command line.
	pub fn as_str(&self) -> &'static str {
		match self {
			PizzaSize::Small => "small",
			PizzaSize::Medium => "medium",
			PizzaSize::Large => "large",
		}
	}

	/// Price of the size before toppings are added.
	pub fn base_price(&self) -> Decimal {
		match self {
			PizzaSize::Small => Decimal::new(1099, PRICE_SCALE),
			PizzaSize::Medium => Decimal::new(1499, PRICE_SCALE),
			PizzaSize::Large => Decimal::new(1899, PRICE_SCALE),
		}
	}
}

impl fmt::Display for PizzaSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(self.as_str())
	}
}

impl FromStr for PizzaSize {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PizzaSize::ALL
			.into_iter()
			.find(|size| size.as_str() == s)
			.ok_or_else(|| ValidationError::InvalidSize(s.to_string()))
	}
}

/// The topping catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topping {
	Cheese,
	Pepperoni,
	Mushrooms,
	Onions,
	Sausage,
	Bacon,
	GreenPeppers,
	Olives,
}

impl Topping {
	/// Every topping, in menu order.
	pub const ALL: [Topping; 8] = [
		Topping::Cheese,
		Topping::Pepperoni,
		Topping::Mushrooms,
		Topping::Onions,
		Topping::Sausage,
		Topping::Bacon,
		Topping::GreenPeppers,
		Topping::Olives,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Topping::Cheese => "cheese",
			Topping::Pepperoni => "pepperoni",
			Topping::Mushrooms => "mushrooms",
			Topping::Onions => "onions",
			Topping::Sausage => "sausage",
			Topping::Bacon => "bacon",
			Topping::GreenPeppers => "green_peppers",
			Topping::Olives => "olives",
		}
	}
}

impl fmt::Display for Topping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(self.as_str())
	}
}

impl FromStr for Topping {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Topping::ALL
			.into_iter()
			.find(|topping| topping.as_str() == s)
			.ok_or_else(|| ValidationError::InvalidTopping(s.to_string()))
	}
}

/// Status of an order in the kitchen.
///
/// Statuses advance strictly one step at a time and never move backwards.
/// `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order has been taken but not started.
	Pending,
	/// Order is being made.
	Preparing,
	/// Order is ready for pickup or delivery.
	Ready,
	/// Order has been handed to the customer.
	Delivered,
}

impl OrderStatus {
	/// Every status, in progression order.
	pub const ALL: [OrderStatus; 4] = [
		OrderStatus::Pending,
		OrderStatus::Preparing,
		OrderStatus::Ready,
		OrderStatus::Delivered,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::Delivered => "delivered",
		}
	}

	/// Returns the status immediately following this one, if any.
	pub fn next(&self) -> Option<OrderStatus> {
		match self {
			OrderStatus::Pending => Some(OrderStatus::Preparing),
			OrderStatus::Preparing => Some(OrderStatus::Ready),
			OrderStatus::Ready => Some(OrderStatus::Delivered),
			OrderStatus::Delivered => None,
		}
	}

	/// Returns true if no further transitions are permitted.
	pub fn is_terminal(&self) -> bool {
		self.next().is_none()
	}

	/// Checks whether moving from this status to `to` is a valid transition.
	pub fn can_transition_to(&self, to: OrderStatus) -> bool {
		self.next() == Some(to)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		OrderStatus::ALL
			.into_iter()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
	}
}

/// A status change that violates the linear progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid status transition from {from} to {to}")]
pub struct TransitionError {
	pub from: OrderStatus,
	pub to: OrderStatus,
}

/// A single customer pizza order.
///
/// Fields are only reachable through accessors: the price is derived from
/// size and toppings, and the status only changes through
/// [`Order::transition_to`]. Decoding re-checks the same rules, so a
/// hand-edited record with a wrong price or a blank name is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord")]
pub struct Order {
	/// Unique identifier, assigned at creation.
	id: String,
	/// Customer name, trimmed and never empty.
	customer_name: String,
	pizza_size: PizzaSize,
	/// Selected toppings, without duplicates.
	toppings: Vec<Topping>,
	status: OrderStatus,
	/// Derived price, rounded to two decimal places.
	#[serde(serialize_with = "price_format::serialize")]
	price: Decimal,
	/// Timestamp when the order was taken.
	created_at: DateTime<Utc>,
}

impl Order {
	/// Creates a new pending order with a fresh id and the current time.
	///
	/// # Errors
	///
	/// Returns [`ValidationError::EmptyName`] if the name is blank and
	/// [`ValidationError::DuplicateTopping`] if a topping repeats.
	pub fn new(
		customer_name: &str,
		pizza_size: PizzaSize,
		toppings: Vec<Topping>,
	) -> Result<Self, ValidationError> {
		let customer_name = validate_customer_name(customer_name)?;
		ensure_unique_toppings(&toppings)?;

		Ok(Self {
			id: Uuid::new_v4().to_string(),
			customer_name,
			pizza_size,
			price: calculate_price(pizza_size, &toppings),
			toppings,
			status: OrderStatus::Pending,
			created_at: Utc::now(),
		})
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn customer_name(&self) -> &str {
		&self.customer_name
	}

	pub fn pizza_size(&self) -> PizzaSize {
		self.pizza_size
	}

	pub fn toppings(&self) -> &[Topping] {
		&self.toppings
	}

	pub fn status(&self) -> OrderStatus {
		self.status
	}

	pub fn price(&self) -> Decimal {
		self.price
	}

	pub fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}

	/// Moves the order to `to` if it is the status immediately following the
	/// current one.
	pub fn transition_to(&mut self, to: OrderStatus) -> Result<(), TransitionError> {
		if !self.status.can_transition_to(to) {
			return Err(TransitionError {
				from: self.status,
				to,
			});
		}
		self.status = to;
		Ok(())
	}
}

/// Order as stored, before the domain rules are re-applied.
#[derive(Deserialize)]
struct OrderRecord {
	id: String,
	customer_name: String,
	pizza_size: PizzaSize,
	toppings: Vec<Topping>,
	status: OrderStatus,
	#[serde(deserialize_with = "price_format::deserialize")]
	price: Decimal,
	created_at: DateTime<Utc>,
}

impl TryFrom<OrderRecord> for Order {
	type Error = ValidationError;

	fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
		if record.id.trim().is_empty() {
			return Err(ValidationError::EmptyId);
		}
		if validate_customer_name(&record.customer_name)? != record.customer_name {
			return Err(ValidationError::UntrimmedName(record.customer_name));
		}
		ensure_unique_toppings(&record.toppings)?;

		let expected = calculate_price(record.pizza_size, &record.toppings);
		if record.price != expected {
			return Err(ValidationError::PriceMismatch {
				expected,
				actual: record.price,
			});
		}

		Ok(Self {
			id: record.id,
			customer_name: record.customer_name,
			pizza_size: record.pizza_size,
			toppings: record.toppings,
			status: record.status,
			price: record.price,
			created_at: record.created_at,
		})
	}
}

/// Checks that a customer name is not blank and returns it trimmed.
pub fn validate_customer_name(customer_name: &str) -> Result<String, ValidationError> {
	let trimmed = customer_name.trim();
	if trimmed.is_empty() {
		return Err(ValidationError::EmptyName);
	}
	Ok(trimmed.to_string())
}

fn ensure_unique_toppings(toppings: &[Topping]) -> Result<(), ValidationError> {
	let mut seen = HashSet::with_capacity(toppings.len());
	for topping in toppings {
		if !seen.insert(topping) {
			return Err(ValidationError::DuplicateTopping(topping.to_string()));
		}
	}
	Ok(())
}

/// Calculates the price of a pizza: base price plus the flat topping
/// surcharge per topping, rounded to two decimal places.
pub fn calculate_price(pizza_size: PizzaSize, toppings: &[Topping]) -> Decimal {
	let toppings_price = topping_price() * Decimal::from(toppings.len());
	(pizza_size.base_price() + toppings_price).round_dp(PRICE_SCALE)
}

/// Prices are stored as plain JSON numbers.
mod price_format {
	use super::PRICE_SCALE;
	use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
	use rust_decimal::Decimal;
	use serde::{de, ser, Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
		let value = price
			.to_f64()
			.ok_or_else(|| ser::Error::custom(format!("price {} is out of range", price)))?;
		serializer.serialize_f64(value)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
		let value = f64::deserialize(deserializer)?;
		if value.is_sign_negative() {
			return Err(de::Error::custom(format!("price {} is negative", value)));
		}
		Decimal::from_f64(value)
			.map(|price| price.round_dp(PRICE_SCALE))
			.ok_or_else(|| de::Error::custom(format!("price {} is not a valid amount", value)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_price_formula_for_every_size() {
		for size in PizzaSize::ALL {
			for count in 0..=Topping::ALL.len() {
				let toppings = Topping::ALL[..count].to_vec();
				let expected =
					(size.base_price() + Decimal::new(150, 2) * Decimal::from(count)).round_dp(2);
				assert_eq!(calculate_price(size, &toppings), expected);
			}
		}
	}

	#[test]
	fn test_medium_with_two_toppings() {
		let order = Order::new(
			"Alice",
			PizzaSize::Medium,
			vec![Topping::Pepperoni, Topping::Olives],
		)
		.unwrap();

		assert_eq!(order.price(), Decimal::new(1799, 2));
		assert_eq!(order.status(), OrderStatus::Pending);
		assert_eq!(order.customer_name(), "Alice");
	}

	#[test]
	fn test_customer_name_is_trimmed() {
		let order = Order::new("  Bob \t", PizzaSize::Small, vec![]).unwrap();
		assert_eq!(order.customer_name(), "Bob");
		assert_eq!(order.price(), Decimal::new(1099, 2));
	}

	#[test]
	fn test_blank_customer_name_rejected() {
		for name in ["", "   ", "\n\t"] {
			let result = Order::new(name, PizzaSize::Large, vec![]);
			assert_eq!(result.unwrap_err(), ValidationError::EmptyName);
		}
	}

	#[test]
	fn test_duplicate_topping_rejected() {
		let result = Order::new(
			"Carol",
			PizzaSize::Small,
			vec![Topping::Bacon, Topping::Cheese, Topping::Bacon],
		);
		assert_eq!(
			result.unwrap_err(),
			ValidationError::DuplicateTopping("bacon".to_string())
		);
	}

	#[test]
	fn test_new_orders_get_distinct_ids() {
		let first = Order::new("Dan", PizzaSize::Small, vec![]).unwrap();
		let second = Order::new("Dan", PizzaSize::Small, vec![]).unwrap();
		assert_ne!(first.id(), second.id());
	}

	#[test]
	fn test_parse_catalog_names() {
		assert_eq!("large".parse::<PizzaSize>().unwrap(), PizzaSize::Large);
		assert_eq!(
			"green_peppers".parse::<Topping>().unwrap(),
			Topping::GreenPeppers
		);
		assert_eq!("ready".parse::<OrderStatus>().unwrap(), OrderStatus::Ready);

		assert_eq!(
			"jumbo".parse::<PizzaSize>().unwrap_err(),
			ValidationError::InvalidSize("jumbo".to_string())
		);
		assert_eq!(
			"pineapple".parse::<Topping>().unwrap_err(),
			ValidationError::InvalidTopping("pineapple".to_string())
		);
		assert_eq!(
			"cancelled".parse::<OrderStatus>().unwrap_err(),
			ValidationError::InvalidStatus("cancelled".to_string())
		);
	}

	#[test]
	fn test_status_progression() {
		assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Preparing));
		assert_eq!(OrderStatus::Preparing.next(), Some(OrderStatus::Ready));
		assert_eq!(OrderStatus::Ready.next(), Some(OrderStatus::Delivered));
		assert!(OrderStatus::Delivered.is_terminal());

		for from in OrderStatus::ALL {
			for to in OrderStatus::ALL {
				assert_eq!(from.can_transition_to(to), from.next() == Some(to));
			}
		}
	}

	#[test]
	fn test_transition_rejects_skip_regress_and_restate() {
		let mut order = Order::new("Eve", PizzaSize::Medium, vec![]).unwrap();
		order.transition_to(OrderStatus::Preparing).unwrap();

		for to in [
			OrderStatus::Delivered,
			OrderStatus::Pending,
			OrderStatus::Preparing,
		] {
			let err = order.transition_to(to).unwrap_err();
			assert_eq!(
				err,
				TransitionError {
					from: OrderStatus::Preparing,
					to
				}
			);
		}
		assert_eq!(order.status(), OrderStatus::Preparing);

		order.transition_to(OrderStatus::Ready).unwrap();
		assert_eq!(order.status(), OrderStatus::Ready);
	}

	#[test]
	fn test_delivered_is_terminal() {
		let mut order = Order::new("Frank", PizzaSize::Large, vec![]).unwrap();
		for to in [
			OrderStatus::Preparing,
			OrderStatus::Ready,
			OrderStatus::Delivered,
		] {
			order.transition_to(to).unwrap();
		}

		for to in OrderStatus::ALL {
			assert!(order.transition_to(to).is_err());
		}
	}

	#[test]
	fn test_json_layout() {
		let order = Order::new(
			"Grace",
			PizzaSize::Large,
			vec![Topping::GreenPeppers, Topping::Mushrooms],
		)
		.unwrap();

		let value = serde_json::to_value(&order).unwrap();
		assert_eq!(value["customer_name"], "Grace");
		assert_eq!(value["pizza_size"], "large");
		assert_eq!(
			value["toppings"],
			serde_json::json!(["green_peppers", "mushrooms"])
		);
		assert_eq!(value["status"], "pending");
		assert_eq!(value["price"], serde_json::json!(21.99));
		assert!(value["id"].is_string());
		assert!(value["created_at"].is_string());

		let decoded: Order = serde_json::from_value(value).unwrap();
		assert_eq!(decoded, order);
	}

	#[test]
	fn test_negative_price_rejected() {
		let json = r#"{
			"id": "abc",
			"customer_name": "Heidi",
			"pizza_size": "small",
			"toppings": [],
			"status": "pending",
			"price": -1.0,
			"created_at": "2024-01-01T12:00:00Z"
		}"#;
		assert!(serde_json::from_str::<Order>(json).is_err());
	}

	fn stored_order(customer_name: &str, toppings: &str, price: &str) -> String {
		format!(
			r#"{{
			"id": "abc",
			"customer_name": "{}",
			"pizza_size": "small",
			"toppings": {},
			"status": "ready",
			"price": {},
			"created_at": "2024-01-01T12:00:00Z"
		}}"#,
			customer_name, toppings, price
		)
	}

	#[test]
	fn test_stored_order_accepted() {
		let order: Order =
			serde_json::from_str(&stored_order("Ivan", r#"["cheese"]"#, "12.49")).unwrap();

		assert_eq!(order.id(), "abc");
		assert_eq!(order.status(), OrderStatus::Ready);
		assert_eq!(order.price(), Decimal::new(1249, 2));
	}

	#[test]
	fn test_stored_order_price_mismatch_rejected() {
		let err =
			serde_json::from_str::<Order>(&stored_order("Ivan", "[]", "99.5")).unwrap_err();
		assert!(err.to_string().contains("does not match the expected price 10.99"));
	}

	#[test]
	fn test_stored_order_blank_or_untrimmed_name_rejected() {
		let err = serde_json::from_str::<Order>(&stored_order("   ", "[]", "10.99")).unwrap_err();
		assert!(err.to_string().contains("Customer name cannot be empty"));

		let err = serde_json::from_str::<Order>(&stored_order(" Ivan", "[]", "10.99")).unwrap_err();
		assert!(err.to_string().contains("is not trimmed"));
	}

	#[test]
	fn test_stored_order_duplicate_topping_rejected() {
		let err = serde_json::from_str::<Order>(&stored_order(
			"Ivan",
			r#"["cheese", "cheese"]"#,
			"13.99",
		))
		.unwrap_err();
		assert!(err.to_string().contains("Topping 'cheese' selected more than once"));
	}

	#[test]
	fn test_display_honours_padding() {
		assert_eq!(format!("[{:<7}]", PizzaSize::Small), "[small  ]");
		assert_eq!(format!("[{:>9}]", OrderStatus::Ready), "[    ready]");
		assert_eq!(format!("[{:<8}]", Topping::Bacon), "[bacon   ]");
	}
}
