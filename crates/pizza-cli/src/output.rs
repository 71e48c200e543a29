//! Plain-text rendering of orders and the menu.

use pizza_types::{format_price, topping_price, truncate_id, Order, PizzaSize, Topping};
use std::io::{self, Write};

/// Writes orders as an aligned table, or a notice when there are none.
pub fn render_orders(out: &mut impl Write, orders: &[Order]) -> io::Result<()> {
	if orders.is_empty() {
		return writeln!(out, "No orders found");
	}

	let name_width = orders
		.iter()
		.map(|order| order.customer_name().chars().count())
		.max()
		.unwrap_or(0)
		.max("Customer".len());

	writeln!(
		out,
		"{:<11}  {:<name_width$}  {:<6}  {:<9}  {:>7}",
		"ID", "Customer", "Size", "Status", "Price"
	)?;
	for order in orders {
		writeln!(
			out,
			"{:<11}  {:<name_width$}  {:<6}  {:<9}  {:>7}",
			truncate_id(order.id()),
			order.customer_name(),
			order.pizza_size(),
			order.status(),
			format_price(order.price()),
		)?;
	}
	Ok(())
}

/// Writes every field of a single order.
pub fn render_order_details(out: &mut impl Write, order: &Order) -> io::Result<()> {
	let toppings = if order.toppings().is_empty() {
		"No toppings".to_string()
	} else {
		order
			.toppings()
			.iter()
			.map(|topping| topping.as_str())
			.collect::<Vec<_>>()
			.join(", ")
	};

	writeln!(out, "ID: {}", order.id())?;
	writeln!(out, "Customer: {}", order.customer_name())?;
	writeln!(out, "Size: {}", order.pizza_size())?;
	writeln!(out, "Toppings: {}", toppings)?;
	writeln!(out, "Status: {}", order.status())?;
	writeln!(out, "Price: {}", format_price(order.price()))?;
	writeln!(out, "Created: {}", order.created_at().to_rfc3339())
}

/// Writes the available sizes with prices and the topping catalog.
pub fn render_menu(out: &mut impl Write) -> io::Result<()> {
	writeln!(out, "Sizes:")?;
	for size in PizzaSize::ALL {
		writeln!(out, "  {:<7} {}", size, format_price(size.base_price()))?;
	}
	writeln!(out, "Toppings ({} each):", format_price(topping_price()))?;
	for topping in Topping::ALL {
		writeln!(out, "  {}", topping)?;
	}
	Ok(())
}
