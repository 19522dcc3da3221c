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

//! `warranted` command-line client
//!
//! Credentials come from `WARRANTED_ACCOUNT_ID` / `WARRANTED_AUTH_TOKEN`
//! (a `.env` file in the working directory is honored). Responses are
//! printed to stdout as pretty JSON; logs go to stderr.

mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use crate::{
	cli::{Cli, Outcome},
	logging::init_logging,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
	dotenv::dotenv().ok();
	init_logging()?;

	let outcome = Cli::parse().run().await?;

	match outcome {
		Outcome::Json(value) => {
			let rendered =
				serde_json::to_string_pretty(&value).context("Failed to render response")?;
			println!("{}", rendered);
		}
		Outcome::Text(line) => println!("{}", line),
		Outcome::Rejected => {
			warn!("Signature does not match");
			println!("invalid");
			return Ok(ExitCode::FAILURE);
		}
	}

	Ok(ExitCode::SUCCESS)
}
