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

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use warranted_sdk::{Client, ClientConfig, HmacAlgorithm, ListOptions, sign, verify};

#[derive(Debug, Parser)]
#[command(name = "warranted", version, about = "Command-line client for the Warranted API")]
pub struct Cli {
	/// API host, overrides WARRANTED_HOST
	#[arg(long, global = true)]
	pub host: Option<String>,

	/// Extra header sent with every request, as NAME:VALUE (repeatable)
	#[arg(long = "header", global = true, value_parser = parse_header)]
	pub headers: Vec<(String, String)>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Show the authenticated account
	Me,
	/// Read or replace the request schema
	Schema {
		#[command(subcommand)]
		command: SchemaCommand,
	},
	/// Show a decision
	Decision {
		/// Decision id, starting with `decision-`
		id: String,
	},
	/// Manage law enforcement requests
	Requests {
		#[command(subcommand)]
		command: RequestsCommand,
	},
	/// Compute the signature Warranted would send for a request
	Sign(SignArgs),
	/// Check an X-Warranted-Signature header; exits 1 when it does not match
	Verify {
		/// Received signature header value
		#[arg(long)]
		signature: String,
		#[command(flatten)]
		request: SignArgs,
	},
}

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
	Get,
	/// Replace the schema with the JSON in FILE
	Update { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum RequestsCommand {
	/// List requests
	List {
		#[arg(long)]
		start_at: Option<String>,
		#[arg(long)]
		limit: Option<String>,
	},
	/// Show one request
	Get { id: String },
	/// Upload a PDF as a new request
	Add { file: PathBuf },
	/// Update a request from the JSON in FILE (must contain `id`)
	Update { file: PathBuf },
	/// Delete a request
	Delete { id: String },
}

#[derive(Debug, Args)]
pub struct SignArgs {
	/// Full URL the request was delivered to
	#[arg(long)]
	pub url: String,
	/// Raw request body
	#[arg(long, conflicts_with = "body_file")]
	pub body: Option<String>,
	/// File holding the raw request body
	#[arg(long)]
	pub body_file: Option<PathBuf>,
	/// HMAC algorithm: sha256, sha384 or sha512
	#[arg(long, default_value = "sha256")]
	pub algorithm: HmacAlgorithm,
	/// Signing key; defaults to WARRANTED_AUTH_TOKEN
	#[arg(long, env = "WARRANTED_AUTH_TOKEN", hide_env_values = true)]
	pub key: String,
}

impl SignArgs {
	fn body(&self) -> Result<String> {
		match (&self.body, &self.body_file) {
			(Some(body), _) => Ok(body.clone()),
			(None, Some(path)) => fs::read_to_string(path)
				.with_context(|| format!("Failed to read body from {}", path.display())),
			(None, None) => Ok(String::new()),
		}
	}

	fn signature(&self) -> Result<String> {
		sign(&self.url, &self.body()?, &self.key, self.algorithm).context("Failed to sign request")
	}
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
	let (name, value) = raw
		.split_once(':')
		.ok_or_else(|| format!("expected NAME:VALUE, got {:?}", raw))?;
	let name = name.trim();
	if name.is_empty() {
		return Err(format!("empty header name in {:?}", raw));
	}
	Ok((name.to_string(), value.trim().to_string()))
}

fn read_json(path: &Path) -> Result<Value> {
	let raw = fs::read_to_string(path)
		.with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Outcome of a command
#[derive(Debug, PartialEq)]
pub enum Outcome {
	/// Print this value as JSON
	Json(Value),
	/// Print this line
	Text(String),
	/// Signature did not match
	Rejected,
}

impl Cli {
	fn client(&self) -> Result<Client> {
		let mut config = ClientConfig::from_env().context(
			"Failed to load credentials (set WARRANTED_ACCOUNT_ID and WARRANTED_AUTH_TOKEN)",
		)?;
		if let Some(host) = &self.host {
			config.host = host.clone();
		}
		config.headers.extend(self.headers.iter().cloned());
		info!(host = %config.host, account_id = %config.account_id, "Using Warranted account");
		config.build().context("Failed to create client")
	}

	pub async fn run(self) -> Result<Outcome> {
		let value = match &self.command {
			Command::Sign(args) => return Ok(Outcome::Text(args.signature()?)),
			Command::Verify { signature, request } => {
				let expected = request.signature()?;
				return Ok(if verify(signature, &expected) {
					Outcome::Text("valid".to_string())
				} else {
					Outcome::Rejected
				});
			}
			Command::Me => self.client()?.me().get().await?,
			Command::Schema { command } => {
				let client = self.client()?;
				match command {
					SchemaCommand::Get => client.schema().get().await?,
					SchemaCommand::Update { file } => {
						client.schema().update(&read_json(file)?).await?
					}
				}
			}
			Command::Decision { id } => self.client()?.decisions().get(id).await?,
			Command::Requests { command } => {
				let client = self.client()?;
				let requests = client.law_enforcement_requests();
				match command {
					RequestsCommand::List { start_at, limit } => {
						let options = ListOptions {
							start_at: start_at.clone(),
							limit: limit.clone(),
						};
						requests.list(&options).await?
					}
					RequestsCommand::Get { id } => requests.get(id).await?,
					RequestsCommand::Add { file } => {
						let bytes = fs::read(file)
							.with_context(|| format!("Failed to read {}", file.display()))?;
						let file_name = file
							.file_name()
							.map(|n| n.to_string_lossy().into_owned())
							.unwrap_or_else(|| warranted_sdk::DEFAULT_UPLOAD_FILE_NAME.to_string());
						if !file_name.to_ascii_lowercase().ends_with(".pdf") {
							bail!("Only PDF files are accepted: {}", file.display());
						}
						requests.add_named(bytes, file_name).await?
					}
					RequestsCommand::Update { file } => requests.update(&read_json(file)?).await?,
					RequestsCommand::Delete { id } => requests.delete(id).await?,
				}
			}
		};
		Ok(Outcome::Json(value))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(std::iter::once("warranted").chain(args.iter().copied())).unwrap()
	}

	#[test]
	fn test_parse_requests_list() {
		let cli = parse(&["requests", "list", "--start-at", "abc", "--limit", "10"]);
		match cli.command {
			Command::Requests {
				command: RequestsCommand::List { start_at, limit },
			} => {
				assert_eq!(start_at.as_deref(), Some("abc"));
				assert_eq!(limit.as_deref(), Some("10"));
			}
			other => panic!("unexpected command: {:?}", other),
		}
	}

	#[test]
	fn test_parse_global_options() {
		let cli = parse(&[
			"--host",
			"http://localhost:3000",
			"me",
			"--header",
			"X-Trace: abc",
		]);
		assert_eq!(cli.host.as_deref(), Some("http://localhost:3000"));
		assert_eq!(cli.headers, vec![("X-Trace".to_string(), "abc".to_string())]);
		assert!(matches!(cli.command, Command::Me));
	}

	#[test]
	fn test_parse_header_rejects_malformed() {
		assert!(parse_header("no-colon").is_err());
		assert!(parse_header(": value").is_err());
		assert_eq!(
			parse_header("A:b:c").unwrap(),
			("A".to_string(), "b:c".to_string())
		);
	}

	#[test]
	fn test_parse_algorithm() {
		let cli = parse(&[
			"sign", "--url", "u", "--body", "b", "--key", "k", "--algorithm", "sha512",
		]);
		match cli.command {
			Command::Sign(args) => assert_eq!(args.algorithm, HmacAlgorithm::Sha512),
			other => panic!("unexpected command: {:?}", other),
		}

		let result = Cli::try_parse_from([
			"warranted", "sign", "--url", "u", "--key", "k", "--algorithm", "md5",
		]);
		assert!(result.is_err());
	}

	#[tokio::test]
	async fn test_sign_and_verify_commands() {
		let signed = parse(&["sign", "--url", "u", "--body", "b", "--key", "k"])
			.run()
			.await
			.unwrap();
		let Outcome::Text(signature) = signed else {
			panic!("expected signature, got {:?}", signed);
		};
		assert_eq!(signature, sign("u", "b", "k", HmacAlgorithm::Sha256).unwrap());

		let accepted = parse(&[
			"verify", "--signature", signature.as_str(), "--url", "u", "--body", "b", "--key", "k",
		])
		.run()
		.await
		.unwrap();
		assert_eq!(accepted, Outcome::Text("valid".to_string()));

		let rejected = parse(&[
			"verify", "--signature", signature.as_str(), "--url", "u", "--body", "c", "--key", "k",
		])
		.run()
		.await
		.unwrap();
		assert_eq!(rejected, Outcome::Rejected);
	}
}
