pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("Embedding dimensions differ: stored {stored}, query {query}.")]
	DimensionMismatch { stored: usize, query: usize },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Store unavailable: {message}")]
	StoreUnavailable { message: String },
	#[error("Provider unavailable: {message}")]
	ProviderUnavailable { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
		Self::InvalidInput { message: message.into() }
	}
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		if iir_storage::is_unavailable(&err) {
			Self::StoreUnavailable { message: err.to_string() }
		} else {
			Self::Storage { message: err.to_string() }
		}
	}
}
impl From<iir_storage::Error> for Error {
	fn from(err: iir_storage::Error) -> Self {
		match err {
			iir_storage::Error::Sqlx(inner) => inner.into(),
		}
	}
}
impl From<iir_providers::Error> for Error {
	fn from(err: iir_providers::Error) -> Self {
		Self::ProviderUnavailable { message: err.to_string() }
	}
}
impl From<iir_domain::DimensionMismatch> for Error {
	fn from(err: iir_domain::DimensionMismatch) -> Self {
		Self::DimensionMismatch { stored: err.left, query: err.right }
	}
}
