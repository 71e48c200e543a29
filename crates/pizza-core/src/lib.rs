//! Core order service for the pizza order tracker.
//!
//! [`OrderService`] owns the business rules: input validation, price
//! derivation and the linear status progression. Every operation loads the
//! full order collection from the [`OrderStore`], applies its change, and
//! saves the full collection back. A failed operation never writes.

use pizza_storage::{OrderStore, StorageError};
use pizza_types::{
	validate_customer_name, CorruptStorePolicy, Order, OrderStatus, PizzaSize, Topping,
	TransitionError, ValidationError,
};
use thiserror::Error;
use tracing::instrument;

pub mod builder;

pub use builder::{BuilderError, OrderServiceBuilder};

/// Errors returned by order service operations.
#[derive(Debug, Error)]
pub enum OrderServiceError {
	/// Input failed a domain rule; nothing was created or modified.
	#[error("Validation error: {0}")]
	Validation(#[from] ValidationError),
	/// No order with the given id exists.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The requested status is not the one immediately following the current one.
	#[error("Invalid status transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The order is delivered and cannot advance any further.
	#[error("Order {id} is already in final state ({status})")]
	FinalState { id: String, status: OrderStatus },
	/// Loading or saving the order collection failed.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

impl From<TransitionError> for OrderServiceError {
	fn from(err: TransitionError) -> Self {
		OrderServiceError::InvalidTransition {
			from: err.from,
			to: err.to,
		}
	}
}

/// Order lifecycle operations over the persisted collection.
pub struct OrderService {
	store: OrderStore,
	on_corrupt: CorruptStorePolicy,
}

impl OrderService {
	/// Creates a service that fails on a corrupt store.
	pub fn new(store: OrderStore) -> Self {
		Self::with_policy(store, CorruptStorePolicy::default())
	}

	pub fn with_policy(store: OrderStore, on_corrupt: CorruptStorePolicy) -> Self {
		Self { store, on_corrupt }
	}

	pub fn corrupt_store_policy(&self) -> CorruptStorePolicy {
		self.on_corrupt
	}

	/// Loads the collection, applying the corrupt-store policy.
	fn load(&self) -> Result<Vec<Order>, OrderServiceError> {
		match self.store.load_all() {
			Ok(orders) => Ok(orders),
			Err(StorageError::Corrupt(reason))
				if self.on_corrupt == CorruptStorePolicy::TreatAsEmpty =>
			{
				tracing::warn!(
					reason = %reason,
					"Order store is unreadable, continuing with an empty order list"
				);
				Ok(Vec::new())
			},
			Err(e) => Err(e.into()),
		}
	}

	/// Validates the request, prices it, and appends a new pending order.
	///
	/// Checks run in order: customer name, size, then each topping.
	///
	/// # Errors
	///
	/// Returns [`OrderServiceError::Validation`] for bad input and
	/// [`OrderServiceError::Storage`] if the collection cannot be loaded or
	/// saved.
	#[instrument(level = "debug", skip(self, toppings))]
	pub fn create_order<S: AsRef<str>>(
		&self,
		customer_name: &str,
		pizza_size: &str,
		toppings: &[S],
	) -> Result<Order, OrderServiceError> {
		let customer_name = validate_customer_name(customer_name)?;
		let pizza_size: PizzaSize = pizza_size.parse()?;
		let toppings = toppings
			.iter()
			.map(|topping| topping.as_ref().parse::<Topping>())
			.collect::<Result<Vec<_>, _>>()?;
		let order = Order::new(&customer_name, pizza_size, toppings)?;

		let mut orders = self.load()?;
		orders.push(order.clone());
		self.store.save_all(&orders)?;

		tracing::debug!(order_id = %order.id(), price = %order.price(), "Created order");
		Ok(order)
	}

	/// Returns every order in persisted order.
	pub fn list_orders(&self) -> Result<Vec<Order>, OrderServiceError> {
		self.load()
	}

	/// Looks up a single order by id.
	pub fn get_order(&self, id: &str) -> Result<Order, OrderServiceError> {
		self.load()?
			.into_iter()
			.find(|order| order.id() == id)
			.ok_or_else(|| OrderServiceError::NotFound(id.to_string()))
	}

	/// Moves an order to `new_status`, which must be the status immediately
	/// following its current one.
	#[instrument(level = "debug", skip(self))]
	pub fn update_status(
		&self,
		id: &str,
		new_status: OrderStatus,
	) -> Result<Order, OrderServiceError> {
		self.update_order_with(id, |order| {
			order.transition_to(new_status)?;
			Ok(())
		})
	}

	/// Moves an order to the next status in the progression.
	#[instrument(level = "debug", skip(self))]
	pub fn advance_status(&self, id: &str) -> Result<Order, OrderServiceError> {
		self.update_order_with(id, |order| {
			let next = order
				.status()
				.next()
				.ok_or_else(|| OrderServiceError::FinalState {
					id: order.id().to_string(),
					status: order.status(),
				})?;
			order.transition_to(next)?;
			Ok(())
		})
	}

	/// Removes an order from the collection.
	#[instrument(level = "debug", skip(self))]
	pub fn delete_order(&self, id: &str) -> Result<(), OrderServiceError> {
		let mut orders = self.load()?;
		let position = orders
			.iter()
			.position(|order| order.id() == id)
			.ok_or_else(|| OrderServiceError::NotFound(id.to_string()))?;

		orders.remove(position);
		self.store.save_all(&orders)?;

		tracing::debug!(order_id = %id, "Deleted order");
		Ok(())
	}

	/// Applies `updater` to one order and persists the whole collection.
	///
	/// Nothing is written if the order is missing or the updater fails.
	fn update_order_with<F>(&self, id: &str, updater: F) -> Result<Order, OrderServiceError>
	where
		F: FnOnce(&mut Order) -> Result<(), OrderServiceError>,
	{
		let mut orders = self.load()?;
		let order = orders
			.iter_mut()
			.find(|order| order.id() == id)
			.ok_or_else(|| OrderServiceError::NotFound(id.to_string()))?;

		updater(order)?;
		let updated = order.clone();
		self.store.save_all(&orders)?;

		tracing::debug!(order_id = %id, status = %updated.status(), "Updated order status");
		Ok(updated)
	}
}
