use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use iir_domain::{correction_ratio, fuzzy_score, rank_order};
use iir_storage::models::Product;

use crate::{Error, ResolverService, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
	Semantic,
	Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
	pub code: String,
	pub description: String,
	pub score: f64,
	pub match_kind: MatchKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub distance: Option<f64>,
}

/// Whether semantic search contributed to a response, and why not when it did not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SemanticStatus {
	Ran { considered: usize },
	Skipped { reason: SemanticSkip },
}
impl SemanticStatus {
	pub fn is_skipped(&self) -> bool {
		matches!(self, Self::Skipped { .. })
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticSkip {
	NoEmbeddings,
	DimensionMismatch { stored: usize, query: usize },
	ProviderUnavailable { message: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductSearchRequest {
	pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolveEanRequest {
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSearchResponse {
	pub query_original: String,
	/// The embedding query after snapping onto a catalog description, if correction applied.
	pub query_used: String,
	pub semantic: Vec<SearchResult>,
	pub fuzzy: Vec<SearchResult>,
	pub semantic_status: SemanticStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EanResolution {
	pub code: String,
	pub description: String,
	pub similarity: f64,
	pub match_kind: MatchKind,
}

impl ResolverService {
	/// Runs semantic and fuzzy product search side by side.
	///
	/// Input correction only steers the embedding query. Fuzzy scores always compare the
	/// caller's description. Semantic search degrades to a reported skip when there are no
	/// embeddings, the provider fails, or the query dimension disagrees with the stored one.
	pub async fn search_vectorized_product(
		&self,
		req: ProductSearchRequest,
	) -> Result<ProductSearchResponse> {
		self.search_products(&req.description, self.cfg.search.product.correct_input).await
	}

	/// Picks the single best product across both result lists. The description is never
	/// corrected, so `similarity` reflects the caller's text.
	pub async fn resolve_ean(&self, req: ResolveEanRequest) -> Result<EanResolution> {
		let response = self.search_products(&req.description, false).await?;
		let min_confidence = self.cfg.search.product.min_confidence;
		let best =
			response.semantic.iter().chain(response.fuzzy.iter()).min_by(|a, b| merge_order(a, b));

		match best {
			Some(best) if best.score >= min_confidence => Ok(EanResolution {
				code: best.code.clone(),
				description: best.description.clone(),
				similarity: best.score,
				match_kind: best.match_kind,
			}),
			_ => Err(Error::NotFound {
				message: format!(
					"No product matched {:?} with confidence of at least {min_confidence}.",
					response.query_original
				),
			}),
		}
	}

	async fn search_products(
		&self,
		description: &str,
		correct_input: bool,
	) -> Result<ProductSearchResponse> {
		let query_original = description.trim().to_string();

		if query_original.is_empty() {
			return Err(Error::invalid_input("description must be non-empty."));
		}

		let cfg = &self.cfg.search.product;
		let catalog = if correct_input { Some(self.catalog.list_products().await?) } else { None };
		let query_used = catalog
			.as_deref()
			.and_then(|products| correct_query(&query_original, products, cfg.correction_cutoff))
			.map(|product| product.description.clone())
			.unwrap_or_else(|| query_original.clone());

		if query_used != query_original {
			tracing::info!(
				query_original = %query_original,
				query_used = %query_used,
				"Corrected product query to catalog description."
			);
		}

		let (semantic, semantic_status) = self.semantic_search(&query_used).await;
		let fuzzy = self.fuzzy_search(&query_original, catalog).await?;

		tracing::info!(
			semantic = semantic.len(),
			fuzzy = fuzzy.len(),
			semantic_skipped = semantic_status.is_skipped(),
			"Product search completed."
		);

		Ok(ProductSearchResponse { query_original, query_used, semantic, fuzzy, semantic_status })
	}

	async fn semantic_search(&self, query: &str) -> (Vec<SearchResult>, SemanticStatus) {
		if self.index.is_empty() {
			tracing::info!(
				model_version = %self.index.model_version(),
				"Skipping semantic search; no stored embeddings."
			);

			return (Vec::new(), skipped(SemanticSkip::NoEmbeddings));
		}

		let vector =
			match self.providers.embedding.embed_query(&self.cfg.providers.embedding, query).await {
				Ok(vector) => vector,
				Err(err) => {
					tracing::warn!(
						error = %err,
						"Skipping semantic search; embedding provider failed."
					);

					return (
						Vec::new(),
						skipped(SemanticSkip::ProviderUnavailable { message: err.to_string() }),
					);
				},
			};
		let cfg = &self.cfg.search.product;

		match self.index.nearest(
			&vector,
			self.score_mapping(),
			cfg.minimal_distance,
			cfg.top_k as usize,
		) {
			Ok(matches) =>
				(matches.results, SemanticStatus::Ran { considered: matches.considered }),
			Err(mismatch) => {
				tracing::warn!(
					stored = mismatch.left,
					query = mismatch.right,
					"Skipping semantic search; embedding dimensions differ."
				);

				(
					Vec::new(),
					skipped(SemanticSkip::DimensionMismatch {
						stored: mismatch.left,
						query: mismatch.right,
					}),
				)
			},
		}
	}

	async fn fuzzy_search(
		&self,
		query: &str,
		catalog: Option<Vec<Product>>,
	) -> Result<Vec<SearchResult>> {
		let cfg = &self.cfg.search.product;
		let top_k = cfg.top_k as usize;
		let mut results =
			match self.catalog.native_fuzzy_search(query, cfg.fuzzy_min_score, top_k) {
				Some(native) => native.await?,
				None => {
					let products = match catalog {
						Some(products) => products,
						None => self.catalog.list_products().await?,
					};

					scan_fuzzy(query, &products, cfg.fuzzy_min_score)
				},
			};

		results.retain(|result| result.score > cfg.fuzzy_min_score);
		results.sort_by(|a, b| rank_order(a.score, &a.code, b.score, &b.code));
		results.truncate(top_k);

		Ok(results)
	}
}

fn skipped(reason: SemanticSkip) -> SemanticStatus {
	SemanticStatus::Skipped { reason }
}

fn scan_fuzzy(query: &str, products: &[Product], min_score: f64) -> Vec<SearchResult> {
	products
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
		.collect()
}

/// Best catalog entry by edit-distance ratio at or above `cutoff`. Ties go to the lowest code.
fn correct_query<'a>(query: &str, products: &'a [Product], cutoff: f64) -> Option<&'a Product> {
	let mut best: Option<(&Product, f64)> = None;

	for product in products {
		let ratio = correction_ratio(query, &product.description);

		if ratio < cutoff {
			continue;
		}

		let better = match best {
			None => true,
			Some((current, current_ratio)) =>
				ratio > current_ratio || (ratio == current_ratio && product.code < current.code),
		};

		if better {
			best = Some((product, ratio));
		}
	}

	best.map(|(product, _)| product)
}

/// Score descending; semantic before fuzzy on equal score; then code ascending.
fn merge_order(a: &SearchResult, b: &SearchResult) -> Ordering {
	fn kind_rank(kind: MatchKind) -> u8 {
		match kind {
			MatchKind::Semantic => 0,
			MatchKind::Fuzzy => 1,
		}
	}

	b.score
		.total_cmp(&a.score)
		.then_with(|| kind_rank(a.match_kind).cmp(&kind_rank(b.match_kind)))
		.then_with(|| a.code.cmp(&b.code))
}
