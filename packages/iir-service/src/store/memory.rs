use iir_domain::{fuzzy_score, rank_order};
use iir_storage::models::{
	Invoice, InvoiceLine, InvoiceLineRecord, LineFilter, Product, ProductEmbedding,
};

use crate::{
	BoxFuture, MatchKind, Result, SearchResult,
	store::{CatalogStore, EmbeddingStore, InvoiceStore},
};

/// In-process reference data. Offers native fuzzy search computed with the shared scorer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	products: Vec<Product>,
	embeddings: Vec<ProductEmbedding>,
	lines: Vec<InvoiceLineRecord>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_product(mut self, code: &str, description: &str) -> Self {
		self.products
			.push(Product { code: code.to_string(), description: description.to_string() });

		self
	}

	/// Adds an embedding for an existing product. The declared dimension is the vector length.
	pub fn with_embedding(self, code: &str, model_version: &str, vector: Vec<f32>) -> Self {
		let dimension = vector.len() as i32;

		self.with_raw_embedding(code, model_version, dimension, vector)
	}

	/// Adds an embedding with an explicit declared dimension, which may disagree with the vector.
	pub fn with_raw_embedding(
		mut self,
		code: &str,
		model_version: &str,
		dimension: i32,
		vector: Vec<f32>,
	) -> Self {
		let description = self
			.products
			.iter()
			.find(|product| product.code == code)
			.map(|product| product.description.clone())
			.unwrap_or_default();

		self.embeddings.push(ProductEmbedding {
			code: code.to_string(),
			description,
			model_version: model_version.to_string(),
			dimension,
			vector,
		});

		self
	}

	/// Adds a line under `invoice`. Lines naming another invoice are skipped.
	pub fn with_invoice_line(mut self, invoice: &Invoice, line: InvoiceLine) -> Self {
		let line_number = line.line_number;

		match InvoiceLineRecord::join(invoice, line) {
			Some(record) => self.lines.push(record),
			None => tracing::warn!(
				invoice_number = %invoice.invoice_number,
				line_number,
				"Skipping invoice line that references a different invoice."
			),
		}

		self
	}
}
impl CatalogStore for MemoryStore {
	fn list_products(&self) -> BoxFuture<'_, Result<Vec<Product>>> {
		let mut products = self.products.clone();

		products.sort_by(|a, b| a.code.cmp(&b.code));

		Box::pin(async move { Ok(products) })
	}

	fn native_fuzzy_search<'a>(
		&'a self,
		query: &'a str,
		min_score: f64,
		limit: usize,
	) -> Option<BoxFuture<'a, Result<Vec<SearchResult>>>> {
		let mut results = self
			.products
			.iter()
			.filter_map(|product| {
				let score = fuzzy_score(query, &product.description);

				(score > min_score).then(|| SearchResult {
					code: product.code.clone(),
					description: product.description.clone(),
					score,
					match_kind: MatchKind::Fuzzy,
					distance: None,
				})
			})
			.collect::<Vec<_>>();

		results.sort_by(|a, b| rank_order(a.score, &a.code, b.score, &b.code));
		results.truncate(limit);

		Some(Box::pin(async move { Ok(results) }))
	}
}
impl EmbeddingStore for MemoryStore {
	fn list_embeddings<'a>(
		&'a self,
		model_version: &'a str,
	) -> BoxFuture<'a, Result<Vec<ProductEmbedding>>> {
		let rows = self
			.embeddings
			.iter()
			.filter(|row| row.model_version == model_version)
			.cloned()
			.collect::<Vec<_>>();

		Box::pin(async move { Ok(rows) })
	}
}
impl InvoiceStore for MemoryStore {
	fn find_lines<'a>(
		&'a self,
		filter: &'a LineFilter,
	) -> BoxFuture<'a, Result<Vec<InvoiceLineRecord>>> {
		let mut rows =
			self.lines.iter().filter(|row| filter.matches(row)).cloned().collect::<Vec<_>>();

		rows.sort_by(|a, b| {
			a.invoice
				.invoice_number
				.cmp(&b.invoice.invoice_number)
				.then_with(|| a.line_number.cmp(&b.line_number))
		});

		Box::pin(async move { Ok(rows) })
	}
}
