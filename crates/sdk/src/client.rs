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

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use reqwest::{
	Client as ReqwestClient, Request, Url,
	header::{HeaderMap, HeaderName, HeaderValue},
	multipart::{Form, Part},
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{DEFAULT_HOST, DEFAULT_TIMEOUT_SECS};
use crate::resources::{
	ApiRequest, Decisions, LawEnforcementRequests, Me, RequestBody, Schema,
};
use crate::signing::{self, HmacAlgorithm, SigningError};
use crate::types::{ListOptions, UPLOAD_FIELD_NAME};

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("No accountId provided")]
	MissingAccountId,
	#[error("No authToken provided")]
	MissingAuthToken,
	#[error("Invalid host: {0}")]
	InvalidHost(String),
	#[error("Invalid header: {0}")]
	InvalidHeader(String),
	#[error("Invalid Decision Id. Must start with `decision-`: {0:?}")]
	InvalidDecisionId(String),
	#[error("id is missing")]
	MissingId,
	#[error("Invalid id: {0:?}")]
	InvalidId(String),
	#[error("Upload is empty")]
	EmptyUpload,
	#[error("Transport error: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("HTTP {status}: {body}")]
	Http { status: u16, body: String },
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),
	#[error("Failed to create runtime: {0}")]
	Runtime(#[from] std::io::Error),
}

impl ClientError {
	/// HTTP status of a rejected request, if the server answered at all
	pub fn status(&self) -> Option<u16> {
		match self {
			ClientError::Http { status, .. } => Some(*status),
			ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
			_ => None,
		}
	}

	/// True for errors raised before anything was sent
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			ClientError::InvalidDecisionId(_)
				| ClientError::MissingId
				| ClientError::InvalidId(_)
				| ClientError::EmptyUpload
		)
	}
}

/// Account credentials
///
/// The auth token is both the basic-auth password and the HMAC key for
/// webhook signatures. It never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	account_id: String,
	auth_token: String,
}

impl Credentials {
	pub fn new(
		account_id: impl Into<String>,
		auth_token: impl Into<String>,
	) -> Result<Self, ClientError> {
		let account_id = account_id.into();
		let auth_token = auth_token.into();
		if account_id.is_empty() {
			return Err(ClientError::MissingAccountId);
		}
		if auth_token.is_empty() {
			return Err(ClientError::MissingAuthToken);
		}
		Ok(Self {
			account_id,
			auth_token,
		})
	}

	pub fn account_id(&self) -> &str {
		&self.account_id
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("account_id", &self.account_id)
			.field("auth_token", &"<redacted>")
			.finish()
	}
}

/// Builder for [`Client`]
///
/// Nothing is validated until [`ClientBuilder::build`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
	account_id: String,
	auth_token: String,
	host: String,
	headers: HashMap<String, String>,
	timeout: Duration,
}

impl ClientBuilder {
	/// Override the API host (default `https://app.warranted.io`)
	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = host.into();
		self
	}

	/// Replace the extra headers sent with every request
	pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
		self.headers = headers;
		self
	}

	/// Add one extra header sent with every request
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn build(self) -> Result<Client, ClientError> {
		let credentials = Credentials::new(self.account_id, self.auth_token)?;
		let host = parse_host(&self.host)?;
		let headers = parse_headers(&self.headers)?;
		let http = ReqwestClient::builder().timeout(self.timeout).build()?;

		Ok(Client {
			credentials: Arc::new(credentials),
			host,
			headers,
			http,
		})
	}
}

fn parse_host(host: &str) -> Result<Url, ClientError> {
	let url = Url::parse(host).map_err(|e| ClientError::InvalidHost(format!("{}: {}", host, e)))?;
	if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
		return Err(ClientError::InvalidHost(host.to_string()));
	}
	Ok(url)
}

fn parse_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, ClientError> {
	let mut map = HeaderMap::with_capacity(headers.len());
	for (name, value) in headers {
		let name = HeaderName::from_bytes(name.as_bytes())
			.map_err(|e| ClientError::InvalidHeader(format!("{}: {}", name, e)))?;
		let value = HeaderValue::from_str(value)
			.map_err(|e| ClientError::InvalidHeader(format!("{}: {}", name, e)))?;
		map.insert(name, value);
	}
	Ok(map)
}

/// Client for the Warranted API
///
/// Cloning is cheap: clones share credentials and the connection pool.
#[derive(Clone)]
pub struct Client {
	credentials: Arc<Credentials>,
	host: Url,
	headers: HeaderMap,
	http: ReqwestClient,
}

impl fmt::Debug for Client {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Client")
			.field("credentials", &self.credentials)
			.field("host", &self.host.as_str())
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl Client {
	/// Create a client against the default host
	///
	/// Fails if either credential is empty.
	pub fn new(
		account_id: impl Into<String>,
		auth_token: impl Into<String>,
	) -> Result<Self, ClientError> {
		Self::builder(account_id, auth_token).build()
	}

	pub fn builder(account_id: impl Into<String>, auth_token: impl Into<String>) -> ClientBuilder {
		ClientBuilder {
			account_id: account_id.into(),
			auth_token: auth_token.into(),
			host: DEFAULT_HOST.to_string(),
			headers: HashMap::new(),
			timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
		}
	}

	/// Copy of this client pointed at another host
	pub fn with_host(&self, host: &str) -> Result<Self, ClientError> {
		Ok(Self {
			host: parse_host(host)?,
			..self.clone()
		})
	}

	/// Copy of this client sending a different set of extra headers
	pub fn with_headers(&self, headers: &HashMap<String, String>) -> Result<Self, ClientError> {
		Ok(Self {
			headers: parse_headers(headers)?,
			..self.clone()
		})
	}

	pub fn account_id(&self) -> &str {
		self.credentials.account_id()
	}

	pub fn host(&self) -> &str {
		self.host.as_str()
	}

	/// Validate the `X-Warranted-Signature` of an inbound request
	///
	/// `url` must be the full URL the request was delivered to and `body`
	/// the raw body exactly as received.
	pub fn validate_request(&self, signature: &str, url: &str, body: &str) -> bool {
		self.validate_request_with(signature, url, body, HmacAlgorithm::default())
	}

	pub fn validate_request_with(
		&self,
		signature: &str,
		url: &str,
		body: &str,
		algorithm: HmacAlgorithm,
	) -> bool {
		let valid = signing::verify_signature(
			signature,
			url,
			body,
			&self.credentials.auth_token,
			algorithm,
		);
		if !valid {
			debug!(url, %algorithm, "Rejected request with invalid signature");
		}
		valid
	}

	/// Signature Warranted would attach to a request for `(url, body)`
	pub fn sign_request(&self, url: &str, body: &str) -> Result<String, ClientError> {
		Ok(signing::sign_with_default(
			url,
			body,
			&self.credentials.auth_token,
		)?)
	}

	pub fn me(&self) -> Me<'_> {
		Me::new(self)
	}

	pub fn schema(&self) -> Schema<'_> {
		Schema::new(self)
	}

	pub fn decisions(&self) -> Decisions<'_> {
		Decisions::new(self)
	}

	pub fn law_enforcement_requests(&self) -> LawEnforcementRequests<'_> {
		LawEnforcementRequests::new(self)
	}

	fn endpoint(&self, segments: &[String]) -> Result<Url, ClientError> {
		let mut url = self.host.clone();
		url.path_segments_mut()
			.map_err(|_| ClientError::InvalidHost(self.host.to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// Turn an API call into an authenticated HTTP request
	pub(crate) fn prepare(&self, call: ApiRequest) -> Result<Request, ClientError> {
		let url = self.endpoint(&call.segments)?;
		let mut builder = self
			.http
			.request(call.method, url)
			.basic_auth(&self.credentials.account_id, Some(&self.credentials.auth_token));

		if !call.query.is_empty() {
			builder = builder.query(&call.query);
		}

		builder = match call.body {
			RequestBody::Empty => builder,
			RequestBody::Json(value) => builder.json(&value),
			RequestBody::Pdf { file, file_name } => {
				let part = Part::bytes(file)
					.file_name(file_name)
					.mime_str("application/pdf")?;
				builder.multipart(Form::new().part(UPLOAD_FIELD_NAME, part))
			}
		};

		// Caller headers win over the defaults set above.
		Ok(builder.headers(self.headers.clone()).build()?)
	}

	/// Send a prepared request and return the response body
	///
	/// JSON bodies are parsed, anything else comes back as a string.
	pub(crate) async fn execute(&self, request: Request) -> Result<Value, ClientError> {
		let method = request.method().clone();
		let path = request.url().path().to_string();
		debug!(%method, path = %path, "Sending request");

		let response = self.http.execute(request).await?;
		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			warn!(%method, path = %path, status = status.as_u16(), "Request failed");
			return Err(ClientError::Http {
				status: status.as_u16(),
				body,
			});
		}

		Ok(parse_body(body))
	}

	pub(crate) async fn send(&self, call: ApiRequest) -> Result<Value, ClientError> {
		let request = self.prepare(call)?;
		self.execute(request).await
	}
}

fn parse_body(body: String) -> Value {
	if body.trim().is_empty() {
		return Value::Null;
	}
	serde_json::from_str(&body).unwrap_or(Value::String(body))
}

/// Synchronous client wrapper
///
/// Owns a Tokio runtime and blocks on the async [`Client`]. Must not be
/// used from inside another Tokio runtime.
pub struct SyncClient {
	client: Client,
	runtime: tokio::runtime::Runtime,
}

impl SyncClient {
	pub fn new(
		account_id: impl Into<String>,
		auth_token: impl Into<String>,
	) -> Result<Self, ClientError> {
		Self::from_client(Client::new(account_id, auth_token)?)
	}

	pub fn from_client(client: Client) -> Result<Self, ClientError> {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()?;
		Ok(Self { client, runtime })
	}

	pub fn client(&self) -> &Client {
		&self.client
	}

	pub fn validate_request(&self, signature: &str, url: &str, body: &str) -> bool {
		self.client.validate_request(signature, url, body)
	}

	pub fn me(&self) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.me().get())
	}

	pub fn schema(&self) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.schema().get())
	}

	pub fn update_schema(&self, schema: &Value) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.schema().update(schema))
	}

	pub fn decision(&self, decision_id: &str) -> Result<Value, ClientError> {
		self.runtime.block_on(self.client.decisions().get(decision_id))
	}

	pub fn list_law_enforcement_requests(&self, options: &ListOptions) -> Result<Value, ClientError> {
		self.runtime
			.block_on(self.client.law_enforcement_requests().list(options))
	}

	pub fn law_enforcement_request(&self, request_id: &str) -> Result<Value, ClientError> {
		self.runtime
			.block_on(self.client.law_enforcement_requests().get(request_id))
	}

	pub fn add_law_enforcement_request(&self, file: Vec<u8>) -> Result<Value, ClientError> {
		self.runtime
			.block_on(self.client.law_enforcement_requests().add(file))
	}

	pub fn add_law_enforcement_request_named(
		&self,
		file: Vec<u8>,
		file_name: impl Into<String>,
	) -> Result<Value, ClientError> {
		self.runtime.block_on(
			self.client
				.law_enforcement_requests()
				.add_named(file, file_name),
		)
	}

	pub fn update_law_enforcement_request(&self, request: &Value) -> Result<Value, ClientError> {
		self.runtime
			.block_on(self.client.law_enforcement_requests().update(request))
	}

	pub fn delete_law_enforcement_request(&self, request_id: &str) -> Result<Value, ClientError> {
		self.runtime
			.block_on(self.client.law_enforcement_requests().delete(request_id))
	}
}
