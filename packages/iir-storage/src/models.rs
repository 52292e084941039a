use time::Date;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Product {
	pub code: String,
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductEmbedding {
	pub code: String,
	pub description: String,
	pub model_version: String,
	pub dimension: i32,
	pub vector: Vec<f32>,
}
impl ProductEmbedding {
	/// A record is usable only when its declared dimension matches its vector length.
	pub fn is_consistent(&self) -> bool {
		self.dimension > 0 && self.dimension as usize == self.vector.len()
	}
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Invoice {
	pub invoice_number: String,
	pub customer_name: String,
	pub region_code: String,
	pub issue_date: Date,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct InvoiceLine {
	pub invoice_number: String,
	pub line_number: i32,
	pub ean_code: String,
	pub description: String,
	pub unit_price: f64,
}

/// An invoice line joined with its owning invoice.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct InvoiceLineRecord {
	#[sqlx(flatten)]
	pub invoice: Invoice,
	pub line_number: i32,
	pub ean_code: String,
	pub description: String,
	pub unit_price: f64,
}
impl InvoiceLineRecord {
	/// Joins a line to its invoice. Returns `None` when the line belongs to another invoice.
	pub fn join(invoice: &Invoice, line: InvoiceLine) -> Option<Self> {
		if line.invoice_number != invoice.invoice_number {
			return None;
		}

		Some(Self {
			invoice: invoice.clone(),
			line_number: line.line_number,
			ean_code: line.ean_code,
			description: line.description,
			unit_price: line.unit_price,
		})
	}
}

/// Store-side prefilter for invoice lines. Every present field narrows the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineFilter {
	pub ean_code: Option<String>,
	/// Compared case-insensitively.
	pub region_code: Option<String>,
	/// Inclusive bounds on `unit_price`.
	pub price_range: Option<(f64, f64)>,
}
impl LineFilter {
	pub fn matches(&self, record: &InvoiceLineRecord) -> bool {
		if let Some(ean) = self.ean_code.as_deref()
			&& record.ean_code != ean
		{
			return false;
		}
		if let Some(region) = self.region_code.as_deref()
			&& !record.invoice.region_code.trim().eq_ignore_ascii_case(region.trim())
		{
			return false;
		}
		if let Some((low, high)) = self.price_range
			&& !(low..=high).contains(&record.unit_price)
		{
			return false;
		}

		true
	}
}
