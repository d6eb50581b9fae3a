use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use nook_config::Error;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.")
}

fn render(value: &Value) -> String {
	toml::to_string(value).expect("Failed to render config.")
}

fn table_mut<'a>(value: &'a mut Value, path: &[&str]) -> &'a mut toml::Table {
	let mut current = value.as_table_mut().expect("Config must be a table.");

	for key in path {
		current = current
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Config must include [{key}]."));
	}

	current
}

fn parse(payload: &str) -> nook_config::Result<nook_config::Config> {
	nook_config::parse(Path::new("inline.toml"), payload)
}

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("nook_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn expect_validation(payload: &str, needle: &str) {
	let err = parse(payload).expect_err("Expected validation error.");
	let message = err.to_string();

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");
	assert!(message.contains(needle), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let result = nook_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Sample config must load.");

	assert_eq!(cfg.memory.recall_limit, 7);
	assert!(!cfg.memory.prefer_semantic);
	assert_eq!(cfg.storage.qdrant.as_ref().map(|qdrant| qdrant.vector_dim), Some(8));
	assert!(cfg.providers.embedding.is_some());
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("nook_config_test_missing.toml");
	let err = nook_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
	assert!(err.to_string().contains("nook_config_test_missing.toml"));
}

#[test]
fn memory_section_is_optional() {
	let mut value = sample_value();

	value.as_table_mut().expect("Config must be a table.").remove("memory");

	let cfg = parse(&render(&value)).expect("Config without [memory] must load.");

	assert_eq!(cfg.memory.recall_limit, 5);
	assert!(cfg.memory.prefer_semantic);
}

#[test]
fn qdrant_and_embedding_are_optional_together() {
	let mut value = sample_value();
	let root = value.as_table_mut().expect("Config must be a table.");

	root.remove("providers");
	table_mut(&mut value, &["storage"]).remove("qdrant");

	let cfg = parse(&render(&value)).expect("Config without a vector index must load.");

	assert!(cfg.storage.qdrant.is_none());
	assert!(cfg.providers.embedding.is_none());
}

#[test]
fn qdrant_requires_embedding_provider() {
	let mut value = sample_value();

	value.as_table_mut().expect("Config must be a table.").remove("providers");

	expect_validation(&render(&value), "providers.embedding is required");
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let mut value = sample_value();

	table_mut(&mut value, &["storage", "qdrant"])
		.insert("vector_dim".to_string(), Value::Integer(16));

	expect_validation(&render(&value), "must match storage.qdrant.vector_dim");
}

#[test]
fn recall_limit_must_be_positive() {
	let mut value = sample_value();

	table_mut(&mut value, &["memory"]).insert("recall_limit".to_string(), Value::Integer(0));

	expect_validation(&render(&value), "memory.recall_limit must be greater than zero.");
}

#[test]
fn pool_size_must_be_positive() {
	let mut value = sample_value();

	table_mut(&mut value, &["storage", "postgres"])
		.insert("pool_max_conns".to_string(), Value::Integer(0));

	expect_validation(&render(&value), "storage.postgres.pool_max_conns");
}

#[test]
fn blank_qdrant_url_disables_vector_index() {
	let mut value = sample_value();

	table_mut(&mut value, &["storage", "qdrant"])
		.insert("url".to_string(), Value::String("  ".to_string()));

	let cfg = parse(&render(&value)).expect("Blank qdrant url must be normalized away.");

	assert!(cfg.storage.qdrant.is_none());
}

#[test]
fn blank_api_key_is_rejected() {
	let mut value = sample_value();

	table_mut(&mut value, &["providers", "embedding"])
		.insert("api_key".to_string(), Value::String(String::new()));

	expect_validation(&render(&value), "providers.embedding.api_key must be non-empty.");
}
