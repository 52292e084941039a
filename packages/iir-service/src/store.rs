//! Read-only store seams. Postgres backs production, `MemoryStore` backs tests and demos.

pub mod memory;
pub mod postgres;

use iir_storage::models::{InvoiceLineRecord, LineFilter, Product, ProductEmbedding};

use crate::{BoxFuture, Result, SearchResult};

pub trait CatalogStore
where
	Self: Send + Sync,
{
	fn list_products(&self) -> BoxFuture<'_, Result<Vec<Product>>>;

	/// Server-side fuzzy matching. Stores that offer it must score exactly like
	/// `iir_domain::fuzzy_score` and return results scoring above `min_score`.
	///
	/// Optional. The Postgres store does not implement it, so the service scans
	/// `list_products` locally; `MemoryStore` does.
	fn native_fuzzy_search<'a>(
		&'a self,
		_query: &'a str,
		_min_score: f64,
		_limit: usize,
	) -> Option<BoxFuture<'a, Result<Vec<SearchResult>>>> {
		None
	}
}

pub trait EmbeddingStore
where
	Self: Send + Sync,
{
	fn list_embeddings<'a>(
		&'a self,
		model_version: &'a str,
	) -> BoxFuture<'a, Result<Vec<ProductEmbedding>>>;
}

pub trait InvoiceStore
where
	Self: Send + Sync,
{
	fn find_lines<'a>(
		&'a self,
		filter: &'a LineFilter,
	) -> BoxFuture<'a, Result<Vec<InvoiceLineRecord>>>;
}
