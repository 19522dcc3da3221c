// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging initialization for the `warranted` CLI
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level filter (default: `warn`)
//!   - Example: `RUST_LOG=warranted_sdk=debug`
//!
//! - `LOG_DIR`: When set, logs are also written to `{LOG_DIR}/warranted/`
//!   - Rotation: one file per day (UTC), e.g. `warranted.2026-01-03.log`
//!   - ANSI colors disabled in file output
//!
//! Console output always goes to stderr so stdout stays clean JSON.

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use tracing::debug;
use tracing_appender::{
	non_blocking,
	non_blocking::WorkerGuard,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Log directory component and file prefix
pub const LOG_COMPONENT_NAME: &str = "warranted";

// Keeps the non-blocking file writer flushing until process exit
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix("log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with stderr output and optional file output
pub fn init_logging() -> Result<()> {
	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let file_layer = match env::var("LOG_DIR") {
		Ok(root) => {
			let log_dir = Path::new(&root).join(LOG_COMPONENT_NAME);
			std::fs::create_dir_all(&log_dir).with_context(|| {
				format!("Failed to create log directory: {}", log_dir.display())
			})?;
			let writer = setup_file_logging(&log_dir)?;
			Some(
				fmt::layer()
					.with_writer(writer)
					.with_timer(fmt::time::UtcTime::rfc_3339())
					.with_target(true)
					.with_ansi(false),
			)
		}
		Err(_) => None,
	};

	Registry::default()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_timer(fmt::time::UtcTime::rfc_3339())
				.with_target(true),
		)
		.with(file_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	debug!("Log level: {}", log_level);
	Ok(())
}
