//! String formatting utilities for presenting orders.

use rust_decimal::Decimal;

/// Truncates an order id for display purposes.
///
/// Shows only the first 8 characters followed by "..." for longer ids.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((end, _)) => format!("{}...", &id[..end]),
		None => id.to_string(),
	}
}

/// Formats a price as dollars with two decimal places.
pub fn format_price(price: Decimal) -> String {
	format!("${:.2}", price)
}
