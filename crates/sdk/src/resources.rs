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

//! Resource accessors
//!
//! Each accessor borrows the [`Client`] and maps one REST resource:
//!
//! | Accessor | Path |
//! |---|---|
//! | [`Me`] | `/api/v1/me` |
//! | [`Schema`] | `/api/v1/schema` |
//! | [`Decisions`] | `/api/v1/decisions/{id}` |
//! | [`LawEnforcementRequests`] | `/api/v1/lawEnforcementRequests[/{id}]`, `/api/v1/lawEnforcementRequest/new` |
//!
//! Identifiers and payloads are checked before a request is built, so a
//! malformed call never reaches the network.

use reqwest::Method;
use serde_json::Value;

use crate::client::{Client, ClientError};
use crate::types::{DECISION_ID_PREFIX, DEFAULT_UPLOAD_FILE_NAME, ListOptions};

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Body of an API call
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RequestBody {
	Empty,
	Json(Value),
	Pdf { file: Vec<u8>, file_name: String },
}

/// Validated API call, not yet bound to a host or credentials
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ApiRequest {
	pub(crate) method: Method,
	pub(crate) segments: Vec<String>,
	pub(crate) query: Vec<(&'static str, String)>,
	pub(crate) body: RequestBody,
}

impl ApiRequest {
	fn new(method: Method, path: &[&str]) -> Self {
		Self {
			method,
			segments: API_PREFIX
				.iter()
				.chain(path)
				.map(|s| s.to_string())
				.collect(),
			query: Vec::new(),
			body: RequestBody::Empty,
		}
	}

	fn query(mut self, query: Vec<(&'static str, String)>) -> Self {
		self.query = query;
		self
	}

	fn body(mut self, body: RequestBody) -> Self {
		self.body = body;
		self
	}
}

/// Check an id that becomes one path segment
///
/// Dot segments are dropped when the URL is built, which would point the
/// call at the collection instead.
fn require_id(id: &str) -> Result<&str, ClientError> {
	match id {
		"" => Err(ClientError::MissingId),
		"." | ".." => Err(ClientError::InvalidId(id.to_string())),
		_ => Ok(id),
	}
}

/// Id carried by an update payload, as a path segment
///
/// Strings and non-zero numbers are accepted.
fn payload_id(payload: &Value) -> Result<String, ClientError> {
	match payload.get("id") {
		Some(Value::String(id)) if !id.is_empty() => require_id(id).map(str::to_string),
		Some(Value::Number(id)) if id.as_f64() != Some(0.0) => Ok(id.to_string()),
		_ => Err(ClientError::MissingId),
	}
}

/// The authenticated account
pub struct Me<'a> {
	client: &'a Client,
}

impl<'a> Me<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Get data about the current user
	pub async fn get(&self) -> Result<Value, ClientError> {
		self.client.send(Self::get_request()).await
	}

	pub(crate) fn get_request() -> ApiRequest {
		ApiRequest::new(Method::GET, &["me"])
	}
}

/// The account's law enforcement request schema
pub struct Schema<'a> {
	client: &'a Client,
}

impl<'a> Schema<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	pub async fn get(&self) -> Result<Value, ClientError> {
		self.client.send(Self::get_request()).await
	}

	/// Replace the schema
	pub async fn update(&self, schema: &Value) -> Result<Value, ClientError> {
		self.client.send(Self::update_request(schema)).await
	}

	pub(crate) fn get_request() -> ApiRequest {
		ApiRequest::new(Method::GET, &["schema"])
	}

	pub(crate) fn update_request(schema: &Value) -> ApiRequest {
		ApiRequest::new(Method::PUT, &["schema"]).body(RequestBody::Json(schema.clone()))
	}
}

/// Decisions made on law enforcement requests
pub struct Decisions<'a> {
	client: &'a Client,
}

impl<'a> Decisions<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Get details about a decision
	///
	/// Fails with [`ClientError::InvalidDecisionId`] unless the id starts
	/// with `decision-`.
	pub async fn get(&self, decision_id: &str) -> Result<Value, ClientError> {
		self.client.send(Self::get_request(decision_id)?).await
	}

	pub(crate) fn get_request(decision_id: &str) -> Result<ApiRequest, ClientError> {
		if !decision_id.starts_with(DECISION_ID_PREFIX) {
			return Err(ClientError::InvalidDecisionId(decision_id.to_string()));
		}
		Ok(ApiRequest::new(Method::GET, &["decisions", decision_id]))
	}
}

/// Law enforcement requests
pub struct LawEnforcementRequests<'a> {
	client: &'a Client,
}

impl<'a> LawEnforcementRequests<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// List requests, optionally paginated
	pub async fn list(&self, options: &ListOptions) -> Result<Value, ClientError> {
		self.client.send(Self::list_request(options)).await
	}

	/// Get one request by id
	///
	/// The id is sent as a single path segment and percent-encoded as is, so
	/// `a%20b` reaches the server as `a%2520b`.
	pub async fn get(&self, request_id: &str) -> Result<Value, ClientError> {
		self.client.send(Self::get_request(request_id)?).await
	}

	/// Submit a new request from a PDF
	pub async fn add(&self, file: impl Into<Vec<u8>>) -> Result<Value, ClientError> {
		self.add_named(file, DEFAULT_UPLOAD_FILE_NAME).await
	}

	/// Submit a new request from a PDF, sending `file_name` with the upload
	pub async fn add_named(
		&self,
		file: impl Into<Vec<u8>>,
		file_name: impl Into<String>,
	) -> Result<Value, ClientError> {
		self.client
			.send(Self::add_request(file.into(), file_name.into())?)
			.await
	}

	/// Update a request; the payload must carry its `id`
	pub async fn update(&self, request: &Value) -> Result<Value, ClientError> {
		self.client.send(Self::update_request(request)?).await
	}

	/// Delete a request; the id is encoded like [`get`](Self::get)
	pub async fn delete(&self, request_id: &str) -> Result<Value, ClientError> {
		self.client.send(Self::delete_request(request_id)?).await
	}

	pub(crate) fn list_request(options: &ListOptions) -> ApiRequest {
		ApiRequest::new(Method::GET, &["lawEnforcementRequests"]).query(options.query_pairs())
	}

	pub(crate) fn get_request(request_id: &str) -> Result<ApiRequest, ClientError> {
		let request_id = require_id(request_id)?;
		Ok(ApiRequest::new(
			Method::GET,
			&["lawEnforcementRequests", request_id],
		))
	}

	pub(crate) fn add_request(file: Vec<u8>, file_name: String) -> Result<ApiRequest, ClientError> {
		if file.is_empty() {
			return Err(ClientError::EmptyUpload);
		}
		Ok(ApiRequest::new(Method::POST, &["lawEnforcementRequest", "new"])
			.body(RequestBody::Pdf { file, file_name }))
	}

	pub(crate) fn update_request(request: &Value) -> Result<ApiRequest, ClientError> {
		let request_id = payload_id(request)?;
		Ok(
			ApiRequest::new(Method::PUT, &["lawEnforcementRequests", request_id.as_str()])
				.body(RequestBody::Json(request.clone())),
		)
	}

	pub(crate) fn delete_request(request_id: &str) -> Result<ApiRequest, ClientError> {
		let request_id = require_id(request_id)?;
		Ok(ApiRequest::new(
			Method::DELETE,
			&["lawEnforcementRequests", request_id],
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
	use serde_json::json;

	fn client() -> Client {
		Client::builder("AC123", "secret-token")
			.host("https://api.test")
			.header("X-Request-Source", "tests")
			.build()
			.unwrap()
	}

	#[test]
	fn test_decision_id_validation() {
		assert!(matches!(
			Decisions::get_request("bad-id"),
			Err(ClientError::InvalidDecisionId(id)) if id == "bad-id"
		));
		assert!(matches!(
			Decisions::get_request(""),
			Err(ClientError::InvalidDecisionId(_))
		));
		assert!(matches!(
			Decisions::get_request("Decision-1"),
			Err(ClientError::InvalidDecisionId(_))
		));
	}

	#[test]
	fn test_decision_request() {
		let request = client()
			.prepare(Decisions::get_request("decision-123").unwrap())
			.unwrap();

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.url().as_str(),
			"https://api.test/api/v1/decisions/decision-123"
		);
		assert_eq!(
			request.headers()[AUTHORIZATION],
			"Basic QUMxMjM6c2VjcmV0LXRva2Vu"
		);
		assert_eq!(request.headers()["x-request-source"], "tests");
		assert!(request.body().is_none());
	}

	#[tokio::test]
	async fn test_invalid_decision_fails_before_network() {
		// Nothing listens on this host; a validation error proves no request was attempted.
		let client = client().with_host("http://127.0.0.1:9").unwrap();
		let result = client.decisions().get("bad-id").await;
		assert!(matches!(result, Err(ClientError::InvalidDecisionId(_))));
	}

	#[test]
	fn test_me_and_schema_requests() {
		let client = client();

		let me = client.prepare(Me::get_request()).unwrap();
		assert_eq!(me.method(), Method::GET);
		assert_eq!(me.url().as_str(), "https://api.test/api/v1/me");

		let schema = client.prepare(Schema::get_request()).unwrap();
		assert_eq!(schema.method(), Method::GET);
		assert_eq!(schema.url().as_str(), "https://api.test/api/v1/schema");
	}

	#[test]
	fn test_schema_update_request() {
		let schema = json!({ "fields": [{ "name": "agency", "type": "string" }] });
		let request = client()
			.prepare(Schema::update_request(&schema))
			.unwrap();

		assert_eq!(request.method(), Method::PUT);
		assert_eq!(request.url().path(), "/api/v1/schema");
		assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
		let body: Value =
			serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
		assert_eq!(body, schema);
	}

	#[test]
	fn test_list_request_query() {
		let client = client();

		let request = client
			.prepare(LawEnforcementRequests::list_request(
				&ListOptions::new().start_at("abc").limit(10),
			))
			.unwrap();
		assert_eq!(request.url().path(), "/api/v1/lawEnforcementRequests");
		assert_eq!(request.url().query(), Some("limit=10"));

		let request = client
			.prepare(LawEnforcementRequests::list_request(
				&ListOptions::new().start_at(20).limit(5),
			))
			.unwrap();
		assert_eq!(request.url().query(), Some("startAt=20&limit=5"));

		let request = client
			.prepare(LawEnforcementRequests::list_request(&ListOptions::new()))
			.unwrap();
		assert_eq!(request.url().query(), None);
	}

	#[test]
	fn test_get_and_delete_requests() {
		let client = client();

		let get = client
			.prepare(LawEnforcementRequests::get_request("ler-1").unwrap())
			.unwrap();
		assert_eq!(get.method(), Method::GET);
		assert_eq!(get.url().path(), "/api/v1/lawEnforcementRequests/ler-1");

		let delete = client
			.prepare(LawEnforcementRequests::delete_request("ler-1").unwrap())
			.unwrap();
		assert_eq!(delete.method(), Method::DELETE);
		assert_eq!(delete.url().path(), "/api/v1/lawEnforcementRequests/ler-1");

		assert!(matches!(
			LawEnforcementRequests::get_request(""),
			Err(ClientError::MissingId)
		));
		assert!(matches!(
			LawEnforcementRequests::delete_request(""),
			Err(ClientError::MissingId)
		));
	}

	#[test]
	fn test_ids_are_single_path_segments() {
		let request = client()
			.prepare(LawEnforcementRequests::get_request("a/b?c").unwrap())
			.unwrap();
		assert_eq!(
			request.url().path(),
			"/api/v1/lawEnforcementRequests/a%2Fb%3Fc"
		);
		assert_eq!(request.url().query(), None);
	}

	#[test]
	fn test_percent_in_id_is_encoded() {
		let request = client()
			.prepare(LawEnforcementRequests::delete_request("a%20b").unwrap())
			.unwrap();
		assert_eq!(
			request.url().path(),
			"/api/v1/lawEnforcementRequests/a%2520b"
		);
	}

	#[test]
	fn test_dot_ids_are_rejected() {
		for id in [".", ".."] {
			assert!(matches!(
				LawEnforcementRequests::get_request(id),
				Err(ClientError::InvalidId(ref rejected)) if rejected == id
			));
			assert!(matches!(
				LawEnforcementRequests::delete_request(id),
				Err(ClientError::InvalidId(_))
			));
			assert!(matches!(
				LawEnforcementRequests::update_request(&json!({ "id": id })),
				Err(ClientError::InvalidId(_))
			));
		}

		let request = client()
			.prepare(LawEnforcementRequests::get_request("...").unwrap())
			.unwrap();
		assert_eq!(request.url().path(), "/api/v1/lawEnforcementRequests/...");
	}

	#[tokio::test]
	async fn test_dot_id_delete_fails_before_network() {
		let client = client().with_host("http://127.0.0.1:9").unwrap();
		let result = client.law_enforcement_requests().delete("..").await;
		assert!(matches!(result, Err(ClientError::InvalidId(_))));
	}

	#[test]
	fn test_update_request() {
		let payload = json!({ "id": "ler-7", "status": "complete" });
		let request = client()
			.prepare(LawEnforcementRequests::update_request(&payload).unwrap())
			.unwrap();

		assert_eq!(request.method(), Method::PUT);
		assert_eq!(request.url().path(), "/api/v1/lawEnforcementRequests/ler-7");
		assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
	}

	#[test]
	fn test_update_request_requires_id() {
		for payload in [
			json!({ "status": "complete" }),
			json!({ "id": "" }),
			json!({ "id": null }),
			json!({ "id": 0 }),
			json!({ "id": false }),
			json!("ler-7"),
		] {
			assert!(matches!(
				LawEnforcementRequests::update_request(&payload),
				Err(ClientError::MissingId)
			));
		}

		let numeric = LawEnforcementRequests::update_request(&json!({ "id": 42 })).unwrap();
		assert_eq!(numeric.segments.last().map(String::as_str), Some("42"));
	}

	#[test]
	fn test_caller_headers_override_content_type() {
		let client = client()
			.with_headers(
				&[("Content-Type".to_string(), "application/vnd.warranted+json".to_string())]
					.into_iter()
					.collect(),
			)
			.unwrap();
		let request = client
			.prepare(Schema::update_request(&json!({})))
			.unwrap();
		assert_eq!(
			request.headers()[CONTENT_TYPE],
			"application/vnd.warranted+json"
		);
		assert_eq!(request.headers().get_all(CONTENT_TYPE).iter().count(), 1);
	}

	#[test]
	fn test_add_request() {
		let request = client()
			.prepare(
				LawEnforcementRequests::add_request(
					b"%PDF-1.4 test".to_vec(),
					"warrant.pdf".to_string(),
				)
				.unwrap(),
			)
			.unwrap();

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.url().path(), "/api/v1/lawEnforcementRequest/new");
		let content_type = request.headers()[CONTENT_TYPE].to_str().unwrap();
		assert!(content_type.starts_with("multipart/form-data; boundary="));
	}

	#[test]
	fn test_add_request_rejects_empty_file() {
		assert!(matches!(
			LawEnforcementRequests::add_request(Vec::new(), "x.pdf".to_string()),
			Err(ClientError::EmptyUpload)
		));
	}

	#[test]
	fn test_host_with_base_path() {
		let client = client().with_host("http://localhost:8080/proxy/").unwrap();
		let request = client.prepare(Me::get_request()).unwrap();
		assert_eq!(
			request.url().as_str(),
			"http://localhost:8080/proxy/api/v1/me"
		);
	}
}
