pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Message(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
}
