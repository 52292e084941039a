mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Embeddings, InvoiceSearch, Postgres, ProductSearch, Providers,
	Search, Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (field, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.mcp_bind", &cfg.service.mcp_bind),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("embeddings.model_version", &cfg.embeddings.model_version),
		("providers.embedding.api_key", &cfg.providers.embedding.api_key),
	] {
		if value.trim().is_empty() {
			return Err(Error::validation(field, "must be non-empty."));
		}
	}

	validate_postgres(&cfg.storage.postgres)?;

	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::validation(
			"providers.embedding.dimensions",
			"must be greater than zero.",
		));
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::validation(
			"providers.embedding.timeout_ms",
			"must be greater than zero.",
		));
	}
	if cfg.providers.embedding.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::validation(
			"providers.embedding.default_headers",
			"values must be strings.",
		));
	}

	validate_product_search(&cfg.search.product)?;
	validate_invoice_search(&cfg.search.invoice)?;

	Ok(())
}

fn validate_postgres(cfg: &Postgres) -> Result<()> {
	if cfg.pool_max_conns == 0 {
		return Err(Error::validation(
			"storage.postgres.pool_max_conns",
			"must be greater than zero.",
		));
	}
	if cfg.pool_min_conns > cfg.pool_max_conns {
		return Err(Error::validation(
			"storage.postgres.pool_min_conns",
			"must not exceed storage.postgres.pool_max_conns.",
		));
	}
	if cfg.acquire_timeout_ms == 0 {
		return Err(Error::validation(
			"storage.postgres.acquire_timeout_ms",
			"must be greater than zero.",
		));
	}

	Ok(())
}

fn validate_product_search(cfg: &ProductSearch) -> Result<()> {
	if cfg.top_k == 0 {
		return Err(Error::validation("search.product.top_k", "must be greater than zero."));
	}
	if !cfg.minimal_distance.is_finite() || cfg.minimal_distance < 0.0 {
		return Err(Error::validation(
			"search.product.minimal_distance",
			"must be a finite number, zero or greater.",
		));
	}
	if !matches!(cfg.score_mapping.as_str(), "inverse" | "linear") {
		return Err(Error::validation(
			"search.product.score_mapping",
			"must be one of inverse or linear.",
		));
	}

	for (field, value) in [
		("search.product.fuzzy_min_score", cfg.fuzzy_min_score),
		("search.product.min_confidence", cfg.min_confidence),
	] {
		if !(0.0..=100.0).contains(&value) {
			return Err(Error::validation(field, "must be in the range 0-100."));
		}
	}

	if !(0.0..=1.0).contains(&cfg.correction_cutoff) {
		return Err(Error::validation(
			"search.product.correction_cutoff",
			"must be in the range 0.0-1.0.",
		));
	}

	Ok(())
}

fn validate_invoice_search(cfg: &InvoiceSearch) -> Result<()> {
	if !(0.0..=100.0).contains(&cfg.customer_min_score) {
		return Err(Error::validation(
			"search.invoice.customer_min_score",
			"must be in the range 0-100.",
		));
	}
	if !cfg.default_margin.is_finite() || cfg.default_margin < 0.0 {
		return Err(Error::validation(
			"search.invoice.default_margin",
			"must be a finite number, zero or greater.",
		));
	}
	if cfg.max_candidates == 0 {
		return Err(Error::validation(
			"search.invoice.max_candidates",
			"must be greater than zero.",
		));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.api_base.as_deref().map(|base| base.trim().is_empty()).unwrap_or(false) {
		cfg.service.api_base = None;
	}
	if cfg.security.mcp_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.mcp_auth_token = None;
	}

	cfg.search.product.score_mapping = cfg.search.product.score_mapping.trim().to_lowercase();
}
