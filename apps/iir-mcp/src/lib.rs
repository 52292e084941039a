pub mod server;

use std::net::SocketAddr;

use clap::Parser;
use color_eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use iir_config::{Config, Security};

/// MCP tool surface that forwards to iir-api.
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

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum McpAuthState {
	Off,
	Bearer { token: String },
}

pub async fn run(args: Args) -> Result<()> {
	let config = iir_config::load(&args.config.config)?;

	init_tracing(&config);

	let auth_state = build_auth_state(&config.security, &config.service.mcp_bind)?;
	let api_base = config.service.api_base.as_deref().unwrap_or(&config.service.http_bind);

	server::serve_mcp(&config.service.mcp_bind, api_base, auth_state).await
}

fn build_auth_state(security: &Security, mcp_bind: &str) -> Result<McpAuthState> {
	let bind_addr: SocketAddr = mcp_bind
		.parse()
		.map_err(|err| eyre::eyre!("service.mcp_bind must be a valid socket address: {err}"))?;

	if security.bind_localhost_only && !bind_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"service.mcp_bind must be a loopback address when bind_localhost_only is true."
		));
	}

	match security.mcp_auth_token.as_deref() {
		Some(token) => Ok(McpAuthState::Bearer { token: token.trim().to_string() }),
		None => {
			if !bind_addr.ip().is_loopback() {
				return Err(eyre::eyre!(
					"service.mcp_bind must be a loopback address when security.mcp_auth_token is unset."
				));
			}

			Ok(McpAuthState::Off)
		},
	}
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
	use crate::{McpAuthState, build_auth_state};
	use iir_config::Security;

	fn security(token: Option<&str>) -> Security {
		Security { bind_localhost_only: false, mcp_auth_token: token.map(str::to_string) }
	}

	#[test]
	fn unauthenticated_mode_requires_loopback_bind() {
		let err = build_auth_state(&security(None), "0.0.0.0:9090").expect_err("expected error");

		assert!(err.to_string().contains("loopback"), "unexpected error: {err}");
		assert_eq!(
			build_auth_state(&security(None), "127.0.0.1:9090").expect("auth state"),
			McpAuthState::Off
		);
	}

	#[test]
	fn token_enables_bearer_auth_on_any_bind() {
		let auth_state =
			build_auth_state(&security(Some("token-1")), "0.0.0.0:9090").expect("auth state");

		assert_eq!(auth_state, McpAuthState::Bearer { token: "token-1".to_string() });
	}

	#[test]
	fn localhost_only_wins_over_token() {
		let security =
			Security { bind_localhost_only: true, mcp_auth_token: Some("token-1".to_string()) };

		assert!(build_auth_state(&security, "0.0.0.0:9090").is_err());
	}

	#[test]
	fn rejects_unparseable_bind() {
		assert!(build_auth_state(&security(None), "localhost").is_err());
	}
}
