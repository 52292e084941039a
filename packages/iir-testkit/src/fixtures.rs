//! Reference rows shared by Postgres-backed tests.
//!
//! Seeding writes through raw SQL so this crate stays independent of `iir-storage`.

use sqlx::PgPool;
use time::{Date, Month};

use crate::{Error, Result};

pub struct ProductRow {
	pub code: &'static str,
	pub description: &'static str,
}

pub struct InvoiceRow {
	pub invoice_number: &'static str,
	pub customer_name: &'static str,
	pub region_code: &'static str,
	pub issue_day: u8,
}

pub struct LineRow {
	pub invoice_number: &'static str,
	pub line_number: i32,
	pub ean_code: &'static str,
	pub description: &'static str,
	pub unit_price: f64,
}

pub const PRODUCTS: &[ProductRow] = &[
	ProductRow { code: "9788532530787", description: "Harry Potter e a Pedra Filosofal" },
	ProductRow { code: "9788532511010", description: "Harry Potter e a Camara Secreta" },
	ProductRow { code: "9788595084759", description: "O Senhor dos Aneis: A Sociedade do Anel" },
	ProductRow { code: "7891000100103", description: "Leite Condensado Moca 395g" },
];

pub const INVOICES: &[InvoiceRow] = &[
	InvoiceRow {
		invoice_number: "NF-1001",
		customer_name: "Customer 43",
		region_code: "RJ",
		issue_day: 3,
	},
	InvoiceRow {
		invoice_number: "NF-1002",
		customer_name: "Customer 43",
		region_code: "SP",
		issue_day: 9,
	},
	InvoiceRow {
		invoice_number: "NF-1003",
		customer_name: "Customer 7",
		region_code: "RJ",
		issue_day: 14,
	},
];

pub const LINES: &[LineRow] = &[
	LineRow {
		invoice_number: "NF-1001",
		line_number: 1,
		ean_code: "9788532530787",
		description: "Harry Potter e a Pedra Filosofal",
		unit_price: 139.55,
	},
	LineRow {
		invoice_number: "NF-1001",
		line_number: 2,
		ean_code: "7891000100103",
		description: "Leite Condensado Moca 395g",
		unit_price: 8.99,
	},
	LineRow {
		invoice_number: "NF-1002",
		line_number: 1,
		ean_code: "9788532530787",
		description: "Harry Potter e a Pedra Filosofal",
		unit_price: 142.00,
	},
	LineRow {
		invoice_number: "NF-1003",
		line_number: 1,
		ean_code: "9788595084759",
		description: "O Senhor dos Aneis: A Sociedade do Anel",
		unit_price: 139.56,
	},
];

pub fn issue_date(day: u8) -> Result<Date> {
	Date::from_calendar_date(2024, Month::March, day)
		.map_err(|err| Error::Message(format!("Invalid fixture date: {err}.")))
}

/// Inserts the fixture catalog and invoices. The schema must already exist.
pub async fn seed_reference_data(pool: &PgPool) -> Result<()> {
	let mut tx = pool.begin().await?;

	for product in PRODUCTS {
		sqlx::query("INSERT INTO products (code, description) VALUES ($1, $2)")
			.bind(product.code)
			.bind(product.description)
			.execute(&mut *tx)
			.await?;
	}
	for invoice in INVOICES {
		sqlx::query(
			"\
INSERT INTO invoices (invoice_number, customer_name, region_code, issue_date)
VALUES ($1, $2, $3, $4)",
		)
		.bind(invoice.invoice_number)
		.bind(invoice.customer_name)
		.bind(invoice.region_code)
		.bind(issue_date(invoice.issue_day)?)
		.execute(&mut *tx)
		.await?;
	}
	for line in LINES {
		sqlx::query(
			"\
INSERT INTO invoice_lines (invoice_number, line_number, ean_code, description, unit_price)
VALUES ($1, $2, $3, $4, $5::float8::numeric(12, 2))",
		)
		.bind(line.invoice_number)
		.bind(line.line_number)
		.bind(line.ean_code)
		.bind(line.description)
		.bind(line.unit_price)
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;

	Ok(())
}

/// Stores one embedding per fixture product. Vectors are supplied by the caller.
pub async fn seed_embeddings(
	pool: &PgPool,
	model_version: &str,
	vectors: &[(&str, Vec<f32>)],
) -> Result<()> {
	for (code, vector) in vectors {
		let dimension = i32::try_from(vector.len())
			.map_err(|_| Error::Message("Fixture vector is too large.".to_string()))?;

		sqlx::query(
			"\
INSERT INTO product_embeddings (code, model_version, dimension, vector)
VALUES ($1, $2, $3, $4)",
		)
		.bind(*code)
		.bind(model_version)
		.bind(dimension)
		.bind(vector)
		.execute(pool)
		.await?;
	}

	Ok(())
}
