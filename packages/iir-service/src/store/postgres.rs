use iir_storage::{
	db::Db,
	models::{InvoiceLineRecord, LineFilter, Product, ProductEmbedding},
	queries,
};

use crate::{
	BoxFuture, Result,
	store::{CatalogStore, EmbeddingStore, InvoiceStore},
};

impl CatalogStore for Db {
	fn list_products(&self) -> BoxFuture<'_, Result<Vec<Product>>> {
		Box::pin(async move { Ok(queries::list_products(self).await?) })
	}
}

impl EmbeddingStore for Db {
	fn list_embeddings<'a>(
		&'a self,
		model_version: &'a str,
	) -> BoxFuture<'a, Result<Vec<ProductEmbedding>>> {
		Box::pin(async move { Ok(queries::list_product_embeddings(self, model_version).await?) })
	}
}

impl InvoiceStore for Db {
	fn find_lines<'a>(
		&'a self,
		filter: &'a LineFilter,
	) -> BoxFuture<'a, Result<Vec<InvoiceLineRecord>>> {
		Box::pin(async move { Ok(queries::find_invoice_lines(self, filter).await?) })
	}
}
