pub mod server;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use nook_service::MemoryService;

#[derive(Debug, Parser)]
#[command(
	version = nook_cli::VERSION,
	rename_all = "kebab",
	styles = nook_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> Result<()> {
	let config = nook_config::load(&args.config)?;

	init_tracing(&config);

	let bind_addr = loopback_bind(&config.service.mcp_bind)?;
	let service = MemoryService::connect(&config).await?;

	server::serve_mcp(bind_addr, Arc::new(service)).await
}

/// The server has no authentication, so it only listens on loopback addresses.
fn loopback_bind(mcp_bind: &str) -> Result<SocketAddr> {
	let bind_addr: SocketAddr = mcp_bind
		.parse()
		.map_err(|err| eyre::eyre!("service.mcp_bind must be a valid socket address: {err}"))?;

	if !bind_addr.ip().is_loopback() {
		return Err(eyre::eyre!("service.mcp_bind must be a loopback address."));
	}

	Ok(bind_addr)
}

fn init_tracing(config: &nook_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
	use crate::loopback_bind;

	#[test]
	fn accepts_loopback_binds() {
		for bind in ["127.0.0.1:8090", "[::1]:8090"] {
			assert!(loopback_bind(bind).is_ok(), "{bind} should be accepted");
		}
	}

	#[test]
	fn rejects_wildcard_binds() {
		let err = loopback_bind("0.0.0.0:8090").expect_err("expected error");

		assert!(err.to_string().contains("loopback"), "unexpected error: {err}");
	}

	#[test]
	fn rejects_unparsable_binds() {
		let err = loopback_bind("localhost").expect_err("expected error");

		assert!(err.to_string().contains("valid socket address"), "unexpected error: {err}");
	}
}
