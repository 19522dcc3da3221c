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

//! Request signing and webhook signature verification
//!
//! Warranted signs every callback it delivers with an HMAC over the exact
//! URL the callback was sent to, followed directly by the raw request body:
//!
//! ```text
//! signature = hex(HMAC-<alg>(auth_token, url || body))
//! ```
//!
//! There is no separator between the URL and the body, and the digest is
//! lowercase hex. The result travels in the `X-Warranted-Signature` header.
//!
//! Verification compares the received header against the locally computed
//! digest in constant time, so the position of the first mismatching byte
//! is never observable.

use std::{fmt, str::FromStr};

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

/// Header carrying the signature on inbound webhook requests
pub const SIGNATURE_HEADER: &str = "X-Warranted-Signature";

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Unsupported HMAC algorithm: {0}")]
	UnsupportedAlgorithm(String),
	#[error("Invalid HMAC key: {0}")]
	InvalidKey(String),
}

/// Hash function underlying the HMAC construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HmacAlgorithm {
	#[default]
	Sha256,
	Sha384,
	Sha512,
}

impl HmacAlgorithm {
	/// Lowercase algorithm name, as used in configuration and on the CLI
	pub fn as_str(&self) -> &'static str {
		match self {
			HmacAlgorithm::Sha256 => "sha256",
			HmacAlgorithm::Sha384 => "sha384",
			HmacAlgorithm::Sha512 => "sha512",
		}
	}

	/// Length of the hex-encoded digest this algorithm produces
	pub fn hex_len(&self) -> usize {
		match self {
			HmacAlgorithm::Sha256 => 64,
			HmacAlgorithm::Sha384 => 96,
			HmacAlgorithm::Sha512 => 128,
		}
	}
}

impl fmt::Display for HmacAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for HmacAlgorithm {
	type Err = SigningError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sha256" => Ok(HmacAlgorithm::Sha256),
			"sha384" => Ok(HmacAlgorithm::Sha384),
			"sha512" => Ok(HmacAlgorithm::Sha512),
			_ => Err(SigningError::UnsupportedAlgorithm(s.to_string())),
		}
	}
}

/// Compute the signature of a request
///
/// The MAC input is the UTF-8 bytes of `url` immediately followed by the
/// UTF-8 bytes of `body`. Returns the digest as lowercase hex.
pub fn sign(
	url: &str,
	body: &str,
	key: &str,
	algorithm: HmacAlgorithm,
) -> Result<String, SigningError> {
	match algorithm {
		HmacAlgorithm::Sha256 => mac_hex::<Hmac<Sha256>>(url, body, key),
		HmacAlgorithm::Sha384 => mac_hex::<Hmac<Sha384>>(url, body, key),
		HmacAlgorithm::Sha512 => mac_hex::<Hmac<Sha512>>(url, body, key),
	}
}

/// Compute the signature of a request with the default algorithm (sha256)
pub fn sign_with_default(url: &str, body: &str, key: &str) -> Result<String, SigningError> {
	sign(url, body, key, HmacAlgorithm::default())
}

fn mac_hex<M: Mac + hmac::digest::KeyInit>(
	url: &str,
	body: &str,
	key: &str,
) -> Result<String, SigningError> {
	let mut mac = <M as Mac>::new_from_slice(key.as_bytes())
		.map_err(|e| SigningError::InvalidKey(e.to_string()))?;
	mac.update(url.as_bytes());
	mac.update(body.as_bytes());
	Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Compare a received signature against the expected one in constant time
///
/// Inputs of different length are simply unequal. Nothing here errors or
/// panics; a malformed candidate is a rejection like any other.
pub fn verify(candidate: &str, expected: &str) -> bool {
	candidate.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Recompute the signature for `(url, body)` and compare it with `signature`
pub fn verify_signature(
	signature: &str,
	url: &str,
	body: &str,
	key: &str,
	algorithm: HmacAlgorithm,
) -> bool {
	match sign(url, body, key, algorithm) {
		Ok(expected) => verify(signature, &expected),
		Err(_) => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// RFC 4231, test case 2: key "Jefe", data "what do ya want for nothing?"
	const RFC4231_SHA256: &str = "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";
	const RFC4231_SHA384: &str = "af45d2e376484031617f78d2b58a6b1b9c7ef464f5a01b47e42ec3736322445e8e2240ca5e69e2c78b3239ecfab21649";
	const RFC4231_SHA512: &str = "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737";

	#[test]
	fn test_sign_known_answers() {
		let url = "what do ya want ";
		let body = "for nothing?";

		assert_eq!(
			sign(url, body, "Jefe", HmacAlgorithm::Sha256).unwrap(),
			RFC4231_SHA256
		);
		assert_eq!(
			sign(url, body, "Jefe", HmacAlgorithm::Sha384).unwrap(),
			RFC4231_SHA384
		);
		assert_eq!(
			sign(url, body, "Jefe", HmacAlgorithm::Sha512).unwrap(),
			RFC4231_SHA512
		);
	}

	#[test]
	fn test_sign_concatenates_without_separator() {
		let split_a = sign("https://a.io/hook", "{\"x\":1}", "k", HmacAlgorithm::Sha256).unwrap();
		let split_b = sign("https://a.io/hook{\"x\"", ":1}", "k", HmacAlgorithm::Sha256).unwrap();
		let whole = sign("https://a.io/hook{\"x\":1}", "", "k", HmacAlgorithm::Sha256).unwrap();

		assert_eq!(split_a, split_b);
		assert_eq!(split_a, whole);
	}

	#[test]
	fn test_sign_webhook_vector() {
		let signature = sign_with_default(
			"https://example.com/webhook",
			"{\"id\":\"decision-1\"}",
			"secret",
		)
		.unwrap();
		assert_eq!(
			signature,
			"638bd468b2d64525b59d0816fe3c6b85cb2e3b7f0ca47f14109d5e28d3c6c7b7"
		);
	}

	#[test]
	fn test_sign_is_lowercase_hex_of_expected_length() {
		for algorithm in [
			HmacAlgorithm::Sha256,
			HmacAlgorithm::Sha384,
			HmacAlgorithm::Sha512,
		] {
			let digest = sign("u", "b", "k", algorithm).unwrap();
			assert_eq!(digest.len(), algorithm.hex_len());
			assert!(
				digest
					.chars()
					.all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
			);
		}
	}

	#[test]
	fn test_sign_empty_key_and_inputs() {
		let digest = sign("", "", "", HmacAlgorithm::Sha256).unwrap();
		assert_eq!(
			digest,
			"b613679a0814d9ec772f95d778c35fc5ff1697c493715653c6c712144292c5ad"
		);
	}

	#[test]
	fn test_verify_same_signature() {
		let a = sign_with_default("https://h/x", "body", "key").unwrap();
		let b = sign_with_default("https://h/x", "body", "key").unwrap();
		assert!(verify(&a, &b));
	}

	#[test]
	fn test_verify_different_keys() {
		let a = sign_with_default("https://h/x", "body", "key-one").unwrap();
		let b = sign_with_default("https://h/x", "body", "key-two").unwrap();
		assert!(!verify(&a, &b));
	}

	#[test]
	fn test_verify_length_mismatch() {
		assert!(verify("", ""));
		assert!(!verify("abc", "abcd"));
		assert!(!verify("abcd", "abc"));
		assert!(!verify("", "a"));
	}

	#[test]
	fn test_verify_is_exact() {
		let digest = sign_with_default("u", "b", "k").unwrap();
		assert!(!verify(&digest.to_uppercase(), &digest));
		assert!(!verify(&format!("sha256={}", digest), &digest));
	}

	#[test]
	fn test_verify_signature() {
		let digest = sign("u", "b", "k", HmacAlgorithm::Sha512).unwrap();
		assert!(verify_signature(&digest, "u", "b", "k", HmacAlgorithm::Sha512));
		assert!(!verify_signature(&digest, "u", "b", "k", HmacAlgorithm::Sha256));
		assert!(!verify_signature(&digest, "u", "b2", "k", HmacAlgorithm::Sha512));
	}

	#[test]
	fn test_algorithm_from_str() {
		assert_eq!("sha256".parse::<HmacAlgorithm>().unwrap(), HmacAlgorithm::Sha256);
		assert_eq!("SHA512".parse::<HmacAlgorithm>().unwrap(), HmacAlgorithm::Sha512);
		assert_eq!(" sha384 ".parse::<HmacAlgorithm>().unwrap(), HmacAlgorithm::Sha384);
		assert!(matches!(
			"md5".parse::<HmacAlgorithm>(),
			Err(SigningError::UnsupportedAlgorithm(name)) if name == "md5"
		));
		assert_eq!(HmacAlgorithm::default(), HmacAlgorithm::Sha256);
		assert_eq!(HmacAlgorithm::Sha512.to_string(), "sha512");
	}
}
