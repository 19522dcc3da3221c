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

//! Client configuration
//!
//! The SDK never reads the environment on its own. Applications that want
//! environment-driven setup call [`ClientConfig::from_env`], which reads:
//!
//! - `WARRANTED_ACCOUNT_ID` (required)
//! - `WARRANTED_AUTH_TOKEN` (required)
//! - `WARRANTED_HOST` (default: `https://app.warranted.io`)
//! - `WARRANTED_TIMEOUT_SECS` (default: `30`)

use std::{collections::HashMap, fmt, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::client::{Client, ClientError};

/// Default API host
pub const DEFAULT_HOST: &str = "https://app.warranted.io";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Prefix shared by all environment variables the SDK understands
pub const ENV_PREFIX: &str = "WARRANTED_";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Failed to load configuration from environment: {0}")]
	Env(#[from] envy::Error),
}

/// Everything needed to construct a [`Client`]
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
	pub account_id: String,
	pub auth_token: String,
	#[serde(default = "default_host")]
	pub host: String,
	/// Extra headers sent with every request
	#[serde(skip)]
	pub headers: HashMap<String, String>,
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

fn default_host() -> String {
	DEFAULT_HOST.to_string()
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
	pub fn new(account_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
		Self {
			account_id: account_id.into(),
			auth_token: auth_token.into(),
			host: default_host(),
			headers: HashMap::new(),
			timeout_secs: DEFAULT_TIMEOUT_SECS,
		}
	}

	/// Load configuration from `WARRANTED_*` environment variables
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_vars(std::env::vars())
	}

	/// Load configuration from an explicit set of variables
	///
	/// Same rules as [`ClientConfig::from_env`]; keys still carry the
	/// `WARRANTED_` prefix.
	pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Build a client from this configuration
	pub fn build(&self) -> Result<Client, ClientError> {
		Client::builder(&self.account_id, &self.auth_token)
			.host(&self.host)
			.headers(self.headers.clone())
			.timeout(self.timeout())
			.build()
	}
}

impl fmt::Debug for ClientConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientConfig")
			.field("account_id", &self.account_id)
			.field("auth_token", &"<redacted>")
			.field("host", &self.host)
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.field("timeout_secs", &self.timeout_secs)
			.finish()
	}
}
