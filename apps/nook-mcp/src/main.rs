use clap::Parser;

use nook_mcp::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	nook_mcp::run(args).await
}
