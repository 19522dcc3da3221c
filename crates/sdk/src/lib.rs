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

//! Warranted SDK - Client library for the Warranted API
//!
//! This crate provides an authenticated client for the Warranted REST API
//! (law enforcement requests, decisions, schema, account) and the HMAC
//! signing scheme used to authenticate Warranted webhooks.
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No runtime initialization (except inside [`SyncClient`])
//! - No environment loading unless [`ClientConfig::from_env`] is called
//!
//! ```no_run
//! # async fn run() -> Result<(), warranted_sdk::ClientError> {
//! let client = warranted_sdk::Client::new("AC123", "auth-token")?;
//! let me = client.me().get().await?;
//! let decision = client.decisions().get("decision-42").await?;
//! # let _ = (me, decision);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod resources;
pub mod signing;
pub mod types;

pub use client::{Client, ClientBuilder, ClientError, Credentials, SyncClient};
pub use config::{ClientConfig, ConfigError, DEFAULT_HOST};
pub use resources::{Decisions, LawEnforcementRequests, Me, Schema};
pub use signing::{
	HmacAlgorithm, SIGNATURE_HEADER, SigningError, sign, sign_with_default, verify,
	verify_signature,
};
pub use types::*;
