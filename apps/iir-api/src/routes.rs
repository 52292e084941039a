use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use iir_service::{
	EanResolution, Error, InvoiceCandidate, InvoiceCriteria, ProductSearchRequest,
	ProductSearchResponse, ResolveEanRequest,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/products/search", post(search_products))
		.route("/v1/products/resolve_ean", post(resolve_ean))
		.route("/v1/invoices/search", post(search_invoices))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_products(
	State(state): State<AppState>,
	Json(payload): Json<ProductSearchRequest>,
) -> Result<Json<ProductSearchResponse>, ApiError> {
	let response = state.service.search_vectorized_product(payload).await?;

	Ok(Json(response))
}

async fn resolve_ean(
	State(state): State<AppState>,
	Json(payload): Json<ResolveEanRequest>,
) -> Result<Json<EanResolution>, ApiError> {
	let response = state.service.resolve_ean(payload).await?;

	Ok(Json(response))
}

async fn search_invoices(
	State(state): State<AppState>,
	Json(payload): Json<InvoiceCriteria>,
) -> Result<Json<Vec<InvoiceCandidate>>, ApiError> {
	let response = state.service.search_invoices_by_criteria(payload).await?;

	Ok(Json(response))
}

#[derive(Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let message = err.to_string();

		match err {
			Error::InvalidInput { .. } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_input", message),
			Error::NotFound { .. } => ApiError::new(StatusCode::NOT_FOUND, "not_found", message),
			Error::DimensionMismatch { .. } =>
				ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "dimension_mismatch", message),
			Error::StoreUnavailable { .. } => {
				tracing::warn!(error = %message, "Store unavailable.");

				ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", message)
			},
			Error::ProviderUnavailable { .. } => {
				tracing::warn!(error = %message, "Provider unavailable.");

				ApiError::new(StatusCode::BAD_GATEWAY, "provider_unavailable", message)
			},
			Error::Storage { .. } => {
				tracing::error!(error = %message, "Storage error.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
