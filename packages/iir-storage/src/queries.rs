use sqlx::{Postgres, QueryBuilder};

use crate::{
	Result,
	db::Db,
	models::{InvoiceLineRecord, LineFilter, Product, ProductEmbedding},
};

pub async fn list_products(db: &Db) -> Result<Vec<Product>> {
	let rows = sqlx::query_as::<_, Product>(
		"\
SELECT code, description
FROM products
ORDER BY code ASC",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn list_product_embeddings(
	db: &Db,
	model_version: &str,
) -> Result<Vec<ProductEmbedding>> {
	let rows = sqlx::query_as::<_, ProductEmbedding>(
		"\
SELECT
	e.code,
	p.description,
	e.model_version,
	e.dimension,
	e.vector
FROM product_embeddings e
JOIN products p ON p.code = e.code
WHERE e.model_version = $1
ORDER BY e.code ASC",
	)
	.bind(model_version)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Returns joined invoice lines narrowed by every present filter field.
///
/// An empty filter returns every line. Customer matching is fuzzy and happens in the caller.
pub async fn find_invoice_lines(db: &Db, filter: &LineFilter) -> Result<Vec<InvoiceLineRecord>> {
	let mut builder = QueryBuilder::<Postgres>::new(
		"\
SELECT
	i.invoice_number,
	i.customer_name,
	i.region_code,
	i.issue_date,
	l.line_number,
	l.ean_code,
	l.description,
	l.unit_price::float8 AS unit_price
FROM invoice_lines l
JOIN invoices i ON i.invoice_number = l.invoice_number
WHERE TRUE",
	);

	if let Some(ean) = filter.ean_code.as_deref() {
		builder.push(" AND l.ean_code = ").push_bind(ean.to_string());
	}
	if let Some(region) = filter.region_code.as_deref() {
		builder.push(" AND upper(i.region_code) = upper(").push_bind(region.trim().to_string());
		builder.push(")");
	}
	if let Some((low, high)) = filter.price_range {
		builder.push(" AND l.unit_price::float8 BETWEEN ").push_bind(low);
		builder.push(" AND ").push_bind(high);
	}

	builder.push(" ORDER BY i.invoice_number ASC, l.line_number ASC");

	let rows = builder.build_query_as::<InvoiceLineRecord>().fetch_all(&db.pool).await?;

	tracing::debug!(rows = rows.len(), "Fetched invoice line candidates.");

	Ok(rows)
}
