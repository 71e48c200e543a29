//! Command-line front end for the pizza order tracker.
//!
//! Each invocation loads configuration, builds an order service over the
//! configured storage backend, runs a single command and exits. Results go to
//! stdout; logs and errors go to stderr.

use clap::{Parser, Subcommand};
use pizza_config::{Config, ConfigError};
use pizza_core::{BuilderError, OrderService, OrderServiceBuilder, OrderServiceError};
use pizza_storage::{get_all_implementations, StorageFactory};
use pizza_types::{truncate_id, OrderStatus};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

mod output;

/// Configuration file picked up from the working directory when `--config`
/// is not given.
const DEFAULT_CONFIG_FILE: &str = "pizza.toml";

/// Command-line arguments for the tracker.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "PIZZA_CONFIG")]
	config: Option<PathBuf>,

	/// Directory holding orders.json (overrides the configured storage)
	#[arg(short, long, env = "PIZZA_DATA_DIR")]
	data_dir: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "warn")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Place a new order
	Create {
		/// Customer name
		#[arg(long)]
		customer: String,
		/// Pizza size (small, medium, large)
		#[arg(long)]
		size: String,
		/// Topping to add; repeat for more than one
		#[arg(short, long = "topping")]
		toppings: Vec<String>,
	},
	/// List all orders in creation order
	List,
	/// Show a single order
	Show {
		/// Order id or a unique prefix of it
		id: String,
	},
	/// Move an order to the given status
	Status {
		/// Order id or a unique prefix of it
		id: String,
		/// Target status (pending, preparing, ready, delivered)
		status: String,
	},
	/// Move an order to its next status
	Advance {
		/// Order id or a unique prefix of it
		id: String,
	},
	/// Remove an order
	Delete {
		/// Order id or a unique prefix of it
		id: String,
	},
	/// Print sizes, prices and toppings
	Menu,
}

/// Errors reported by the command-line front end.
#[derive(Debug, Error)]
enum CliError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Build(#[from] BuilderError),
	#[error(transparent)]
	Order(#[from] OrderServiceError),
	#[error("Order id '{prefix}' is ambiguous ({matches} orders match)")]
	AmbiguousId { prefix: String, matches: usize },
	#[error("Output error: {0}")]
	Output(#[from] io::Error),
}

fn main() -> ExitCode {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
	fmt()
		.with_env_filter(env_filter)
		.with_writer(io::stderr)
		.with_target(true)
		.init();

	let stdout = io::stdout();
	match run(args, &mut stdout.lock()) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("Error: {}", e);
			ExitCode::FAILURE
		},
	}
}

/// Loads configuration and executes the requested command.
fn run(args: Args, out: &mut impl Write) -> Result<(), CliError> {
	if let Command::Menu = args.command {
		return Ok(output::render_menu(out)?);
	}

	let config = load_config(args.config.as_deref(), args.data_dir.as_deref())?;
	tracing::info!(
		tracker = %config.tracker.name,
		storage = %config.storage.primary,
		"Loaded configuration"
	);
	let service = build_service(config)?;

	match args.command {
		Command::Create {
			customer,
			size,
			toppings,
		} => {
			let order = service.create_order(&customer, &size, &toppings)?;
			writeln!(out, "Created order {}", order.id())?;
			output::render_order_details(out, &order)?;
		},
		Command::List => {
			let orders = service.list_orders()?;
			output::render_orders(out, &orders)?;
		},
		Command::Show { id } => {
			let id = resolve_order_id(&service, &id)?;
			let order = service.get_order(&id)?;
			output::render_order_details(out, &order)?;
		},
		Command::Status { id, status } => {
			let status: OrderStatus = status.parse().map_err(OrderServiceError::from)?;
			let id = resolve_order_id(&service, &id)?;
			let order = service.update_status(&id, status)?;
			writeln!(
				out,
				"Order {} is now {}",
				truncate_id(order.id()),
				order.status()
			)?;
		},
		Command::Advance { id } => {
			let id = resolve_order_id(&service, &id)?;
			let order = service.advance_status(&id)?;
			writeln!(
				out,
				"Order {} is now {}",
				truncate_id(order.id()),
				order.status()
			)?;
		},
		Command::Delete { id } => {
			let id = resolve_order_id(&service, &id)?;
			service.delete_order(&id)?;
			writeln!(out, "Deleted order {}", id)?;
		},
		Command::Menu => output::render_menu(out)?,
	}

	Ok(())
}

/// Picks the configuration source.
///
/// An explicit path must exist. Without one, `pizza.toml` in the working
/// directory is used if present, otherwise built-in defaults. A data
/// directory always wins over the configured storage.
fn load_config(config: Option<&Path>, data_dir: Option<&Path>) -> Result<Config, ConfigError> {
	let config = match config {
		Some(path) => Config::from_file(path)?,
		None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Config::from_file(DEFAULT_CONFIG_FILE)?,
		None => Config::default(),
	};

	Ok(match data_dir {
		Some(dir) => config.with_storage_path(dir),
		None => config,
	})
}

/// Maps every registered storage implementation name to its factory.
fn storage_factories() -> HashMap<String, StorageFactory> {
	get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

/// Builds the order service with every storage backend this binary ships.
fn build_service(config: Config) -> Result<OrderService, BuilderError> {
	OrderServiceBuilder::new(config).build(&storage_factories())
}

/// Expands a unique id prefix to the full order id.
///
/// An exact match always wins. Anything else is passed through unchanged so
/// the service reports it as not found.
fn resolve_order_id(service: &OrderService, input: &str) -> Result<String, CliError> {
	let orders = service.list_orders()?;
	if orders.iter().any(|order| order.id() == input) {
		return Ok(input.to_string());
	}

	let prefix = input.trim_end_matches("...");
	if prefix.is_empty() {
		return Ok(input.to_string());
	}
	let matches: Vec<&str> = orders
		.iter()
		.map(|order| order.id())
		.filter(|id| id.starts_with(prefix))
		.collect();

	match matches.as_slice() {
		[] => Ok(input.to_string()),
		[id] => Ok(id.to_string()),
		_ => Err(CliError::AmbiguousId {
			prefix: prefix.to_string(),
			matches: matches.len(),
		}),
	}
}
