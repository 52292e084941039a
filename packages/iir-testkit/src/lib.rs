//! Throwaway Postgres databases and reference fixtures for IIR integration tests.

mod error;
pub mod fixtures;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

pub const DSN_ENV: &str = "IIR_PG_DSN";

/// Maintenance databases tried, in order, to issue `CREATE DATABASE` and `DROP DATABASE`.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A fresh database on the server behind `IIR_PG_DSN`.
///
/// Call [`TestDatabase::cleanup`] at the end of a test. Drop falls back to a blocking cleanup
/// so a panicking test does not leak its database.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("{DSN_ENV} is not a valid DSN: {err}.")))?;
		let (maintenance, mut conn) = maintenance_connection(&base).await?;
		let name = format!("iir_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await.map_err(|err| {
			Error::Message(format!("Could not create test database {name}: {err}."))
		})?;
		conn.close().await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		// Drop can run on a runtime worker, where blocking on a future would panic.
		let handle = thread::spawn(move || {
			let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

			runtime.block_on(drop_database(&name, &maintenance))
		});

		match handle.join() {
			Ok(Ok(())) => {},
			Ok(Err(err)) => eprintln!("Leaked test database {}: {err}.", self.name),
			Err(_) => eprintln!("Leaked test database {}: cleanup thread panicked.", self.name),
		}
	}
}

/// Reads `IIR_PG_DSN`, treating a blank value as unset.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().map(|dsn| dsn.trim().to_string()).filter(|dsn| !dsn.is_empty())
}

async fn maintenance_connection(
	base: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failures = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failures.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!(
		"No maintenance database is reachable ({}).",
		failures.join("; ")
	)))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	// FORCE terminates sessions a failed test left open.
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str())
		.await
		.map_err(|err| Error::Message(format!("Could not drop test database {name}: {err}.")))?;
	conn.close().await?;

	Ok(())
}
