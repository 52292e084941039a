use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Result, schema};

/// Bounded Postgres pool. Connections return to the pool when dropped, on every exit path.
#[derive(Clone)]
pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &iir_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect(&cfg.dsn).await?;

		tracing::info!(
			min_conns = cfg.pool_min_conns,
			max_conns = cfg.pool_max_conns,
			acquire_timeout_ms = cfg.acquire_timeout_ms,
			"Postgres pool ready."
		);

		Ok(Self { pool })
	}

	/// Builds the pool without opening a connection until first use.
	pub fn connect_lazy(cfg: &iir_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect_lazy(&cfg.dsn)?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 4_120_771;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}

fn pool_options(cfg: &iir_config::Postgres) -> PgPoolOptions {
	PgPoolOptions::new()
		.min_connections(cfg.pool_min_conns)
		.max_connections(cfg.pool_max_conns)
		.acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
}
