pub mod routes;
pub mod state;

use std::net::SocketAddr;

use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

/// HTTP surface of the invoice item resolver.
#[derive(Debug, Parser)]
#[command(
	version = iir_cli::VERSION,
	rename_all = "kebab",
	styles = iir_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: iir_cli::ConfigArgs,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = iir_config::load(&args.config.config)?;

	init_tracing(&config);

	let http_addr: SocketAddr = config.service.http_bind.parse()?;

	ensure_bind_allowed(&config.security, http_addr)?;

	let state = AppState::new(config).await?;
	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, version = iir_cli::VERSION, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}

pub fn ensure_bind_allowed(
	security: &iir_config::Security,
	addr: SocketAddr,
) -> color_eyre::Result<()> {
	if security.bind_localhost_only && !addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"http_bind must be a loopback address when bind_localhost_only is true."
		));
	}

	Ok(())
}

fn init_tracing(config: &iir_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
