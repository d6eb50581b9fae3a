use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use serde::Serialize;
use time::Duration;
use tracing_subscriber::EnvFilter;

use nook_domain::ttl;
use nook_service::{
	ForgetRequest, ForgetResponse, Memory, MemoryService, RecallRequest, RecallResponse,
	RememberRequest, SweepResponse,
};

#[derive(Debug, Parser)]
#[command(
	version = nook_cli::VERSION,
	rename_all = "kebab",
	styles = nook_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Store a new memory.
	Remember(RememberArgs),
	/// Find memories by meaning, falling back to text match.
	Recall(RecallArgs),
	/// Preview or delete memories matching the given filters.
	Forget(ForgetArgs),
	/// Delete expired notes now.
	Sweep,
}

#[derive(Debug, clap::Args)]
pub struct RememberArgs {
	pub content: String,
	#[arg(long)]
	pub title: Option<String>,
	/// One of user-pref, project, decision, fact, todo.
	#[arg(long)]
	pub category: Option<String>,
	/// 1 (trivial) to 5 (critical). Other values fall back to 3.
	#[arg(long, allow_negative_numbers = true)]
	pub importance: Option<i32>,
	/// Time to live such as 30m, 24h, or 7d.
	#[arg(long, value_parser = parse_ttl_arg)]
	pub ttl: Option<Duration>,
	#[arg(long)]
	pub source: Option<String>,
	#[arg(long)]
	pub source_ref: Option<String>,
}
impl From<RememberArgs> for RememberRequest {
	fn from(args: RememberArgs) -> Self {
		Self {
			content: args.content,
			title: args.title,
			category: args.category,
			importance: args.importance,
			ttl: args.ttl,
			source: args.source,
			source_ref: args.source_ref,
		}
	}
}

#[derive(Debug, clap::Args)]
pub struct RecallArgs {
	pub query: String,
	#[arg(long)]
	pub limit: Option<u32>,
	#[arg(long)]
	pub category: Option<String>,
	/// Skip the vector index and match text only.
	#[arg(long)]
	pub no_semantic: bool,
}
impl From<RecallArgs> for RecallRequest {
	fn from(args: RecallArgs) -> Self {
		Self {
			query: args.query,
			limit: args.limit,
			category: args.category,
			use_semantic: args.no_semantic.then_some(false),
		}
	}
}

#[derive(Debug, clap::Args)]
pub struct ForgetArgs {
	#[arg(long)]
	pub older_than_days: Option<f64>,
	#[arg(long)]
	pub importance_below: Option<i32>,
	#[arg(long)]
	pub category: Option<String>,
	#[arg(long)]
	pub query: Option<String>,
	/// Forget exactly this memory. Other filters are ignored.
	#[arg(long)]
	pub id: Option<i64>,
	/// Preview matches without deleting. This is the default unless `--force` is given.
	#[arg(long, conflicts_with = "force")]
	pub dry_run: bool,
	/// Delete the matches. Without any filter the run is still a preview.
	#[arg(long)]
	pub force: bool,
}
impl From<ForgetArgs> for ForgetRequest {
	fn from(args: ForgetArgs) -> Self {
		Self {
			older_than_days: args.older_than_days,
			importance_below: args.importance_below,
			category: args.category,
			query: args.query,
			id: args.id,
			dry_run: args.dry_run || !args.force,
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
	Memory(Box<Memory>),
	Recall(RecallResponse),
	Forget(ForgetResponse),
	Sweep(SweepResponse),
}

pub async fn run(args: Args) -> color_eyre::Result<ExitCode> {
	let config = nook_config::load(&args.config)?;

	init_tracing(&config);

	let service = MemoryService::connect(&config).await?;
	let output = match execute(&service, args.command).await {
		Ok(output) => output,
		Err(err) if err.is_caller_error() => {
			eprintln!("{err}");

			return Ok(ExitCode::from(2));
		},
		Err(err) => return Err(err.into()),
	};

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(ExitCode::SUCCESS)
}

pub async fn execute(service: &MemoryService, command: Command) -> nook_service::Result<Output> {
	let output = match command {
		Command::Remember(args) => Output::Memory(Box::new(service.remember(args.into()).await?)),
		Command::Recall(args) => Output::Recall(service.recall(args.into()).await?),
		Command::Forget(args) => Output::Forget(service.forget(args.into()).await?),
		Command::Sweep => Output::Sweep(service.sweep_expired().await?),
	};

	Ok(output)
}

fn parse_ttl_arg(raw: &str) -> Result<Duration, String> {
	ttl::parse_ttl(raw).ok_or_else(|| {
		format!("invalid ttl {raw:?}, expected a positive amount with a unit like 30m or 7d")
	})
}

fn init_tracing(config: &nook_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
}
