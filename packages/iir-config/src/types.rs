use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub embeddings: Embeddings,
	#[serde(default)]
	pub search: Search,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub mcp_bind: String,
	pub log_level: String,
	/// Base URL iir-mcp forwards tool calls to. Falls back to `http_bind` when unset.
	pub api_base: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	#[serde(default = "default_pool_min_conns")]
	pub pool_min_conns: u32,
	pub pool_max_conns: u32,
	#[serde(default = "default_acquire_timeout_ms")]
	pub acquire_timeout_ms: u64,
	/// Applies `sql/` at startup. Off by default, so the engine stays read-only unless a
	/// deployment opts in for first-time setup.
	#[serde(default)]
	pub ensure_schema: bool,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Selects which precomputed embeddings are comparable with the runtime provider.
#[derive(Debug, Deserialize)]
pub struct Embeddings {
	pub model_version: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Search {
	pub product: ProductSearch,
	pub invoice: InvoiceSearch,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProductSearch {
	pub top_k: u32,
	pub minimal_distance: f64,
	/// One of "inverse" or "linear".
	pub score_mapping: String,
	/// Fuzzy results must score strictly above this value.
	pub fuzzy_min_score: f64,
	pub min_confidence: f64,
	pub correct_input: bool,
	pub correction_cutoff: f64,
}
impl Default for ProductSearch {
	fn default() -> Self {
		Self {
			top_k: 5,
			minimal_distance: 1.0,
			score_mapping: "inverse".to_string(),
			fuzzy_min_score: 70.0,
			min_confidence: 70.0,
			correct_input: true,
			correction_cutoff: 0.6,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InvoiceSearch {
	pub customer_min_score: f64,
	/// Absolute currency tolerance, not a percentage.
	pub default_margin: f64,
	pub max_candidates: u32,
}
impl Default for InvoiceSearch {
	fn default() -> Self {
		Self { customer_min_score: 80.0, default_margin: 0.01, max_candidates: 50 }
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub mcp_auth_token: Option<String>,
}

fn default_pool_min_conns() -> u32 {
	1
}

fn default_acquire_timeout_ms() -> u64 {
	5_000
}
