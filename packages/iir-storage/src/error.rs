#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
}
impl Error {
	/// True when the failure is about reaching the database rather than the query itself.
	pub fn is_unavailable(&self) -> bool {
		match self {
			Self::Sqlx(err) => is_unavailable(err),
		}
	}
}

pub fn is_unavailable(err: &sqlx::Error) -> bool {
	matches!(
		err,
		sqlx::Error::PoolTimedOut
			| sqlx::Error::PoolClosed
			| sqlx::Error::Io(_)
			| sqlx::Error::Tls(_)
			| sqlx::Error::WorkerCrashed
	)
}
