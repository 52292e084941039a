pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// True when the provider could not be reached or answered with a server-side failure.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Reqwest(err) =>
				err.is_timeout()
					|| err.is_connect()
					|| err.status().map(|status| status.is_server_error()).unwrap_or(false),
			_ => false,
		}
	}
}
