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

use serde::{Deserialize, Serialize};

/// Prefix every decision id carries
pub const DECISION_ID_PREFIX: &str = "decision-";

/// Multipart field name the upload endpoint reads the PDF from
///
/// The spelling matches what the server expects.
pub const UPLOAD_FIELD_NAME: &str = "lawEncforementRequest";

/// File name sent with an upload when the caller does not provide one
pub const DEFAULT_UPLOAD_FILE_NAME: &str = "lawEnforcementRequest.pdf";

/// Pagination for listing law enforcement requests
///
/// Values are kept as the caller gave them and normalized when the query
/// string is built: anything without a leading integer is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
	/// Offset of the first request to return
	pub start_at: Option<String>,
	/// Maximum number of requests to return
	pub limit: Option<String>,
}

impl ListOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn start_at(mut self, start_at: impl ToString) -> Self {
		self.start_at = Some(start_at.to_string());
		self
	}

	pub fn limit(mut self, limit: impl ToString) -> Self {
		self.limit = Some(limit.to_string());
		self
	}

	/// Query parameters to send, in `startAt`, `limit` order
	pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::with_capacity(2);
		if let Some(start_at) = self.start_at.as_deref().and_then(parse_leading_int) {
			pairs.push(("startAt", start_at.to_string()));
		}
		if let Some(limit) = self.limit.as_deref().and_then(parse_leading_int) {
			pairs.push(("limit", limit.to_string()));
		}
		pairs
	}
}

/// Lenient base-10 integer parse
///
/// Skips leading whitespace, accepts one optional sign, then takes the
/// longest run of ASCII digits and ignores whatever follows. `"12abc"` is
/// 12, `"abc"` and `"-"` are `None`. Values outside `i64` are `None`.
pub fn parse_leading_int(value: &str) -> Option<i64> {
	let trimmed = value.trim_start();
	let (negative, rest) = match trimmed.as_bytes().first() {
		Some(b'-') => (true, &trimmed[1..]),
		Some(b'+') => (false, &trimmed[1..]),
		_ => (false, trimmed),
	};

	let digits_end = rest
		.bytes()
		.position(|b| !b.is_ascii_digit())
		.unwrap_or(rest.len());
	if digits_end == 0 {
		return None;
	}

	let magnitude: i64 = rest[..digits_end].parse().ok()?;
	Some(if negative { -magnitude } else { magnitude })
}
