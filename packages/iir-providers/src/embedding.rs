//! OpenAI-compatible embedding client.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use iir_config::EmbeddingProviderConfig;

/// Embeds a batch of texts, returning vectors in input order.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = endpoint_url(&cfg.api_base, &cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});

	tracing::debug!(provider_id = %cfg.provider_id, model = %cfg.model, inputs = texts.len(), "Requesting embeddings.");

	let res = client
		.post(url)
		.headers(crate::request_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding provider returned {} vectors for {} inputs.",
				vectors.len(),
				texts.len()
			),
		});
	}

	Ok(vectors)
}

/// Embeds a single query text.
pub async fn embed_query(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let mut vectors = embed(cfg, &[text.to_string()]).await?;

	vectors.pop().ok_or_else(|| Error::InvalidResponse {
		message: "Embedding provider returned no vectors.".to_string(),
	})
}

fn endpoint_url(api_base: &str, path: &str) -> String {
	let base = api_base.trim_end_matches('/');
	let path = path.trim();

	if path.is_empty() {
		return base.to_string();
	}
	if path.starts_with('/') { format!("{base}{path}") } else { format!("{base}/{path}") }
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
