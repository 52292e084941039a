use clap::Parser;

use iir_mcp::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	iir_mcp::run(args).await
}
