use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = iir_api::Args::parse();

	iir_api::run(args).await
}
