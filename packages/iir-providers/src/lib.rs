//! Clients for the external model providers IIR calls at query time.

pub mod embedding;

mod error;

pub use error::{Error, Result};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

/// Builds provider request headers. `Authorization` is set last, so configured headers cannot
/// replace the API key.
pub fn request_headers(api_key: &str, extra: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::with_capacity(extra.len() + 1);

	for (name, value) in extra {
		let value = value.as_str().ok_or_else(|| Error::InvalidConfig {
			message: format!("Header {name} must be a string, got {value}."),
		})?;

		let name = HeaderName::from_bytes(name.trim().as_bytes())?;

		headers.insert(name, HeaderValue::from_str(value)?);
	}

	let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))?;

	bearer.set_sensitive(true);
	headers.insert(AUTHORIZATION, bearer);

	Ok(headers)
}
