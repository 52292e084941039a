pub mod date_serde;
pub mod embeddings;
pub mod invoice;
pub mod product;
pub mod store;

mod error;

pub use embeddings::EmbeddingIndex;
pub use error::{Error, Result};
pub use invoice::{InvoiceCandidate, InvoiceCriteria, InvoiceView, LineView};
pub use product::{
	EanResolution, MatchKind, ProductSearchRequest, ProductSearchResponse, ResolveEanRequest,
	SearchResult, SemanticSkip, SemanticStatus,
};
pub use store::{CatalogStore, EmbeddingStore, InvoiceStore, memory::MemoryStore};

use std::{future::Future, pin::Pin, sync::Arc};

use iir_config::{Config, EmbeddingProviderConfig};
use iir_domain::ScoreMapping;
use iir_providers::embedding;
use iir_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_query<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

/// The resolution engine. Holds read-only handles only, so one instance serves concurrent calls.
pub struct ResolverService {
	pub cfg: Config,
	pub catalog: Arc<dyn CatalogStore>,
	pub invoices: Arc<dyn InvoiceStore>,
	pub index: Arc<EmbeddingIndex>,
	pub providers: Providers,
	score_mapping: ScoreMapping,
}
impl ResolverService {
	/// Production wiring: Postgres for both stores, the HTTP embedding provider, and the
	/// embedding index for `embeddings.model_version` loaded once.
	///
	/// Only reads unless `storage.postgres.ensure_schema` opts in to schema setup.
	pub async fn connect(cfg: Config) -> Result<Self> {
		let db = Db::connect(&cfg.storage.postgres).await?;

		if cfg.storage.postgres.ensure_schema {
			db.ensure_schema().await?;
		}

		let index = EmbeddingIndex::load(&db, &cfg.embeddings.model_version).await?;
		let db = Arc::new(db);

		Self::with_parts(cfg, db.clone(), db, index, Providers::default())
	}

	pub fn with_parts(
		cfg: Config,
		catalog: Arc<dyn CatalogStore>,
		invoices: Arc<dyn InvoiceStore>,
		index: EmbeddingIndex,
		providers: Providers,
	) -> Result<Self> {
		let score_mapping = cfg
			.search
			.product
			.score_mapping
			.parse::<ScoreMapping>()
			.map_err(|err| Error::InvalidInput { message: err.to_string() })?;

		Ok(Self { cfg, catalog, invoices, index: Arc::new(index), providers, score_mapping })
	}

	pub fn score_mapping(&self) -> ScoreMapping {
		self.score_mapping
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed_query<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(embedding::embed_query(cfg, text).await?) })
	}
}
