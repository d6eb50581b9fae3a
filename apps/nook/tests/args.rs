use clap::Parser;
use time::Duration;

use nook::{Args, Command};
use nook_service::{ForgetRequest, RecallRequest, RememberRequest};

fn parse(argv: &[&str]) -> Args {
	let argv = ["nook", "-c", "nook.toml"].iter().chain(argv);

	Args::try_parse_from(argv).expect("Failed to parse arguments.")
}

#[test]
fn remember_parses_metadata_and_ttl() {
	let args = parse(&[
		"remember",
		"Always use snake_case",
		"--category",
		"fact",
		"--importance",
		"4",
		"--ttl",
		"24h",
		"--source-ref",
		"chat-1",
	]);
	let Command::Remember(remember) = args.command else { panic!("Expected remember command.") };
	let req = RememberRequest::from(remember);

	assert_eq!(args.config.to_str(), Some("nook.toml"));
	assert_eq!(req.content, "Always use snake_case");
	assert_eq!(req.category.as_deref(), Some("fact"));
	assert_eq!(req.importance, Some(4));
	assert_eq!(req.ttl, Some(Duration::hours(24)));
	assert_eq!(req.source_ref.as_deref(), Some("chat-1"));
	assert_eq!(req.source, None);
}

#[test]
fn remember_rejects_invalid_ttl() {
	for ttl in ["0s", "-5m", "soon", "10y"] {
		let result =
			Args::try_parse_from(["nook", "-c", "nook.toml", "remember", "x", "--ttl", ttl]);

		assert!(result.is_err(), "ttl {ttl} should be rejected");
	}
}

#[test]
fn recall_leaves_semantic_preference_to_config_by_default() {
	let Command::Recall(recall) = parse(&["recall", "snake_case"]).command else {
		panic!("Expected recall command.")
	};
	let req = RecallRequest::from(recall);

	assert_eq!(req.use_semantic, None);
	assert_eq!(req.limit, None);

	let Command::Recall(recall) =
		parse(&["recall", "snake_case", "--no-semantic", "--limit", "3"]).command
	else {
		panic!("Expected recall command.")
	};
	let req = RecallRequest::from(recall);

	assert_eq!(req.use_semantic, Some(false));
	assert_eq!(req.limit, Some(3));
}

#[test]
fn forget_maps_filters() {
	let Command::Forget(forget) =
		parse(&["forget", "--importance-below", "3", "--older-than-days", "1.5", "--force"])
			.command
	else {
		panic!("Expected forget command.")
	};
	let req = ForgetRequest::from(forget);

	assert_eq!(req.importance_below, Some(3));
	assert_eq!(req.older_than_days, Some(1.5));
	assert!(!req.dry_run);
}

#[test]
fn forget_previews_unless_forced() {
	let Command::Forget(forget) = parse(&["forget", "--category", "fact"]).command else {
		panic!("Expected forget command.")
	};
	let req = ForgetRequest::from(forget);

	assert_eq!(req.category.as_deref(), Some("fact"));
	assert!(req.dry_run);

	let Command::Forget(forget) = parse(&["forget", "--id", "7", "--dry-run"]).command else {
		panic!("Expected forget command.")
	};

	assert!(ForgetRequest::from(forget).dry_run);
}

#[test]
fn forget_rejects_dry_run_with_force() {
	let result = Args::try_parse_from(["nook", "-c", "nook.toml", "forget", "--dry-run", "--force"]);

	assert!(result.is_err());
}

#[test]
fn sweep_takes_no_arguments() {
	assert!(matches!(parse(&["sweep"]).command, Command::Sweep));
}
