//! Immutable in-memory view of precomputed product embeddings for one model version.

use std::collections::BTreeMap;

use iir_domain::{DimensionMismatch, ScoreMapping, rank_order, vector_distance};
use iir_storage::models::ProductEmbedding;

use crate::{MatchKind, Result, SearchResult, store::EmbeddingStore};

#[derive(Debug, Clone, PartialEq)]
struct Entry {
	code: String,
	description: String,
	vector: Vec<f32>,
}

/// Outcome of a nearest-neighbour scan.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestMatches {
	pub results: Vec<SearchResult>,
	/// Embeddings within `minimal_distance`, before truncation.
	pub considered: usize,
}

/// Exhaustive Euclidean scan over a single dimension. Shared read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
	model_version: String,
	dimension: Option<usize>,
	entries: Vec<Entry>,
}
impl EmbeddingIndex {
	pub fn empty(model_version: &str) -> Self {
		Self { model_version: model_version.to_string(), dimension: None, entries: Vec::new() }
	}

	pub async fn load(store: &dyn EmbeddingStore, model_version: &str) -> Result<Self> {
		let records = store.list_embeddings(model_version).await?;

		Ok(Self::from_records(model_version, records))
	}

	/// Keeps consistent records of `model_version` sharing the most common dimension.
	///
	/// Everything else is dropped with a warning. When two dimensions are equally common the
	/// smaller one wins.
	pub fn from_records(model_version: &str, records: Vec<ProductEmbedding>) -> Self {
		let total = records.len();
		let usable = records
			.into_iter()
			.filter(|record| {
				let keep = record.model_version == model_version && record.is_consistent();

				if !keep {
					tracing::warn!(
						code = %record.code,
						model_version = %record.model_version,
						declared_dimension = record.dimension,
						vector_len = record.vector.len(),
						"Dropping unusable product embedding."
					);
				}

				keep
			})
			.collect::<Vec<_>>();
		let mut counts = BTreeMap::<usize, usize>::new();

		for record in &usable {
			*counts.entry(record.vector.len()).or_default() += 1;
		}

		let dimension = counts
			.iter()
			.max_by(|(dim_a, count_a), (dim_b, count_b)| {
				count_a.cmp(count_b).then_with(|| dim_b.cmp(dim_a))
			})
			.map(|(dim, _)| *dim);
		let mut entries = usable
			.into_iter()
			.filter(|record| Some(record.vector.len()) == dimension)
			.map(|record| Entry {
				code: record.code,
				description: record.description,
				vector: record.vector,
			})
			.collect::<Vec<_>>();

		entries.sort_by(|a, b| a.code.cmp(&b.code));

		if counts.len() > 1 {
			tracing::warn!(
				model_version,
				dimensions = ?counts,
				kept_dimension = ?dimension,
				"Product embeddings disagree on dimension."
			);
		}

		tracing::info!(
			model_version,
			loaded = entries.len(),
			dropped = total - entries.len(),
			dimension = ?dimension,
			"Embedding index ready."
		);

		Self { model_version: model_version.to_string(), dimension, entries }
	}

	pub fn model_version(&self) -> &str {
		&self.model_version
	}

	/// Dimension shared by every stored vector, or `None` when the index is empty.
	pub fn dimension(&self) -> Option<usize> {
		self.dimension
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Ranks stored products by distance to `query`.
	///
	/// Products farther than `minimal_distance` are excluded before scoring. Fails without
	/// comparing anything when the query dimension differs from the stored one.
	pub fn nearest(
		&self,
		query: &[f32],
		mapping: ScoreMapping,
		minimal_distance: f64,
		top_k: usize,
	) -> Result<NearestMatches, DimensionMismatch> {
		let Some(dimension) = self.dimension else {
			return Ok(NearestMatches { results: Vec::new(), considered: 0 });
		};

		if query.len() != dimension {
			return Err(DimensionMismatch { left: dimension, right: query.len() });
		}

		let mut results = Vec::new();

		for entry in &self.entries {
			let distance = vector_distance(&entry.vector, query)?;
			let Some(score) = mapping.to_score(distance, minimal_distance) else {
				continue;
			};

			results.push(SearchResult {
				code: entry.code.clone(),
				description: entry.description.clone(),
				score,
				match_kind: MatchKind::Semantic,
				distance: Some(distance),
			});
		}

		let considered = results.len();

		results.sort_by(|a, b| rank_order(a.score, &a.code, b.score, &b.code));
		results.truncate(top_k);

		Ok(NearestMatches { results, considered })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(code: &str, version: &str, vector: Vec<f32>) -> ProductEmbedding {
		ProductEmbedding {
			code: code.to_string(),
			description: format!("Product {code}"),
			model_version: version.to_string(),
			dimension: vector.len() as i32,
			vector,
		}
	}

	#[test]
	fn drops_inconsistent_and_foreign_records() {
		let mut broken = record("3", "m1", vec![1.0, 0.0]);

		broken.dimension = 3;

		let index = EmbeddingIndex::from_records(
			"m1",
			vec![record("1", "m1", vec![0.0, 0.0]), record("2", "m2", vec![0.0, 1.0]), broken],
		);

		assert_eq!(index.len(), 1);
		assert_eq!(index.dimension(), Some(2));
		assert_eq!(index.model_version(), "m1");
	}

	#[test]
	fn keeps_the_dominant_dimension() {
		let index = EmbeddingIndex::from_records(
			"m1",
			vec![
				record("1", "m1", vec![0.0, 0.0]),
				record("2", "m1", vec![0.0, 1.0]),
				record("3", "m1", vec![0.0, 1.0, 2.0]),
			],
		);

		assert_eq!(index.len(), 2);
		assert_eq!(index.dimension(), Some(2));
	}

	#[test]
	fn nearest_excludes_far_vectors_and_breaks_ties_by_code() {
		let index = EmbeddingIndex::from_records(
			"m1",
			vec![
				record("b", "m1", vec![1.0, 0.0]),
				record("a", "m1", vec![0.0, 1.0]),
				record("c", "m1", vec![5.0, 5.0]),
			],
		);
		let matches =
			index.nearest(&[0.0, 0.0], ScoreMapping::Inverse, 1.0, 5).expect("same dimension");

		assert_eq!(matches.considered, 2);
		assert_eq!(
			matches.results.iter().map(|r| r.code.as_str()).collect::<Vec<_>>(),
			vec!["a", "b"]
		);
		assert_eq!(matches.results[0].score, 50.0);
		assert_eq!(matches.results[0].distance, Some(1.0));
	}

	#[test]
	fn nearest_reports_dimension_mismatch() {
		let index = EmbeddingIndex::from_records("m1", vec![record("a", "m1", vec![0.0, 1.0])]);
		let err = index
			.nearest(&[0.0, 1.0, 2.0], ScoreMapping::Inverse, 1.0, 5)
			.expect_err("expected mismatch");

		assert_eq!(err, DimensionMismatch { left: 2, right: 3 });
	}

	#[test]
	fn empty_index_has_no_dimension() {
		let index = EmbeddingIndex::empty("m1");

		assert!(index.is_empty());
		assert_eq!(index.dimension(), None);
	}
}
