use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::Date;

use iir_domain::{MAX_SCORE, clamp_score, fuzzy_score};
use iir_storage::models::{InvoiceLineRecord, LineFilter};

use crate::{Error, ResolverService, Result};

/// Absorbs binary floating-point noise in price comparisons.
const PRICE_EPSILON: f64 = 1e-9;

/// Loose criteria for locating the invoice line behind a returned item. All fields are optional
/// but at least one of customer, region, EAN or price must be present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvoiceCriteria {
	#[serde(default)]
	pub customer: Option<String>,
	#[serde(default)]
	pub region: Option<String>,
	#[serde(default)]
	pub ean_code: Option<String>,
	#[serde(default)]
	pub price: Option<f64>,
	/// Absolute currency tolerance around `price`.
	#[serde(default)]
	pub margin: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceView {
	pub invoice_number: String,
	pub customer_name: String,
	pub region_code: String,
	#[serde(with = "crate::date_serde")]
	pub issue_date: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineView {
	pub line_number: i32,
	pub ean_code: String,
	pub description: String,
	pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCandidate {
	pub invoice: InvoiceView,
	pub line: LineView,
	pub match_score: f64,
	pub price_delta: Option<f64>,
	pub customer_score: Option<f64>,
	pub ean_match: bool,
}

#[derive(Debug)]
struct Criteria {
	customer: Option<String>,
	region: Option<String>,
	ean_code: Option<String>,
	price: Option<f64>,
	margin: f64,
}
impl Criteria {
	fn parse(req: InvoiceCriteria, default_margin: f64) -> Result<Self> {
		let customer = non_blank(req.customer);
		let region = non_blank(req.region);
		let ean_code = non_blank(req.ean_code);

		if let Some(price) = req.price
			&& !price.is_finite()
		{
			return Err(Error::invalid_input("price must be a finite number."));
		}

		let margin = req.margin.unwrap_or(default_margin);

		if !margin.is_finite() || margin < 0.0 {
			return Err(Error::invalid_input("margin must be a finite number, zero or greater."));
		}
		if customer.is_none() && region.is_none() && ean_code.is_none() && req.price.is_none() {
			return Err(Error::invalid_input(
				"At least one of customer, region, ean_code or price is required.",
			));
		}

		Ok(Self { customer, region, ean_code, price: req.price, margin })
	}

	fn line_filter(&self) -> LineFilter {
		LineFilter {
			ean_code: self.ean_code.clone(),
			region_code: self.region.clone(),
			price_range: self.price.map(|price| {
				(price - self.margin - PRICE_EPSILON, price + self.margin + PRICE_EPSILON)
			}),
		}
	}

	/// Applies the precise predicates and scores a prefiltered record.
	fn evaluate(
		&self,
		record: InvoiceLineRecord,
		customer_min_score: f64,
	) -> Option<InvoiceCandidate> {
		let mut scores = Vec::with_capacity(4);
		let ean_match = match self.ean_code.as_deref() {
			Some(ean) if record.ean_code == ean => {
				scores.push(MAX_SCORE);

				true
			},
			Some(_) => return None,
			None => false,
		};

		if let Some(region) = self.region.as_deref() {
			if !record.invoice.region_code.trim().eq_ignore_ascii_case(region) {
				return None;
			}

			scores.push(MAX_SCORE);
		}

		let customer_score = match self.customer.as_deref() {
			Some(customer) => {
				let score = fuzzy_score(customer, &record.invoice.customer_name);

				if score < customer_min_score {
					return None;
				}

				scores.push(score);

				Some(score)
			},
			None => None,
		};
		let price_delta = match self.price {
			Some(price) => {
				let delta = (record.unit_price - price).abs();

				if delta > self.margin + PRICE_EPSILON {
					return None;
				}

				scores.push(if self.margin == 0.0 {
					MAX_SCORE
				} else {
					MAX_SCORE * (1.0 - delta / self.margin)
				});

				Some(round_to(delta, 4))
			},
			None => None,
		};
		let match_score = if scores.is_empty() {
			0.0
		} else {
			clamp_score(scores.iter().sum::<f64>() / scores.len() as f64)
		};

		Some(InvoiceCandidate {
			invoice: InvoiceView {
				invoice_number: record.invoice.invoice_number,
				customer_name: record.invoice.customer_name,
				region_code: record.invoice.region_code,
				issue_date: record.invoice.issue_date,
			},
			line: LineView {
				line_number: record.line_number,
				ean_code: record.ean_code,
				description: record.description,
				unit_price: record.unit_price,
			},
			match_score,
			price_delta,
			customer_score,
			ean_match,
		})
	}
}

impl ResolverService {
	/// Returns ranked invoice-line candidates. An empty list is a valid "no match" outcome.
	pub async fn search_invoices_by_criteria(
		&self,
		req: InvoiceCriteria,
	) -> Result<Vec<InvoiceCandidate>> {
		let cfg = &self.cfg.search.invoice;
		let criteria = Criteria::parse(req, cfg.default_margin)?;
		let filter = criteria.line_filter();
		let records = self.invoices.find_lines(&filter).await?;
		let fetched = records.len();
		let mut candidates = records
			.into_iter()
			.filter_map(|record| criteria.evaluate(record, cfg.customer_min_score))
			.collect::<Vec<_>>();

		candidates.sort_by(candidate_order);
		candidates.truncate(cfg.max_candidates as usize);

		tracing::info!(fetched, candidates = candidates.len(), "Invoice search completed.");

		Ok(candidates)
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn round_to(value: f64, decimals: i32) -> f64 {
	let factor = 10_f64.powi(decimals);

	(value * factor).round() / factor
}

/// EAN match first, then smallest price delta, then best customer score, then invoice position.
fn candidate_order(a: &InvoiceCandidate, b: &InvoiceCandidate) -> Ordering {
	b.ean_match
		.cmp(&a.ean_match)
		.then_with(|| match (a.price_delta, b.price_delta) {
			(Some(left), Some(right)) => left.total_cmp(&right),
			_ => Ordering::Equal,
		})
		.then_with(|| match (a.customer_score, b.customer_score) {
			(Some(left), Some(right)) => right.total_cmp(&left),
			_ => Ordering::Equal,
		})
		.then_with(|| a.invoice.invoice_number.cmp(&b.invoice.invoice_number))
		.then_with(|| a.line.line_number.cmp(&b.line.line_number))
}
