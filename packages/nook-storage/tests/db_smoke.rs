use time::{Duration, OffsetDateTime};

use nook_config::Postgres;
use nook_storage::{Error, db::Db, models::NewNote, queries};
use nook_testkit::TestDatabase;

async fn bootstrap(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn new_note(title: &str, content: &str) -> NewNote {
	NewNote { title: title.to_string(), content: content.to_string(), ..Default::default() }
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOOK_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = nook_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set NOOK_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	db.ensure_schema().await.expect("Second schema bootstrap must succeed.");

	for table in ["notes", "tags", "note_tags"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Missing table {table}.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOOK_PG_DSN to run."]
async fn tags_are_created_once_and_attached_idempotently() {
	let Some(base_dsn) = nook_testkit::env_dsn() else {
		eprintln!("Skipping tags_are_created_once_and_attached_idempotently; set NOOK_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let note = queries::insert_note(&db, &new_note("Style", "Always use snake_case"))
		.await
		.expect("Failed to insert note.");
	let first = queries::create_tag_if_absent(&db, "memory").await.expect("Failed to create tag.");
	let second =
		queries::create_tag_if_absent(&db, "memory").await.expect("Failed to reuse tag.");

	assert_eq!(first, second);

	queries::attach_tag(&db, note.note_id, first.tag_id).await.expect("Failed to attach tag.");
	queries::attach_tag(&db, note.note_id, first.tag_id).await.expect("Reattach must be a no-op.");

	let tags = queries::list_note_tags(&db, note.note_id).await.expect("Failed to list tags.");

	assert_eq!(tags, vec![first]);

	let tagged = queries::list_notes_by_tag(&db, "memory").await.expect("Failed to list notes.");

	assert_eq!(tagged.len(), 1);
	assert_eq!(tagged[0].note_id, note.note_id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOOK_PG_DSN to run."]
async fn text_search_is_case_insensitive_and_literal() {
	let Some(base_dsn) = nook_testkit::env_dsn() else {
		eprintln!("Skipping text_search_is_case_insensitive_and_literal; set NOOK_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	queries::insert_note(&db, &new_note("Naming", "Always use SNAKE_CASE"))
		.await
		.expect("Failed to insert note.");
	queries::insert_note(&db, &new_note("Other", "snakeXcase is not a match"))
		.await
		.expect("Failed to insert note.");

	let hits = queries::search_notes_text(&db, "snake_case", Some(10))
		.await
		.expect("Failed to search notes.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].title, "Naming");

	let unbounded =
		queries::search_notes_text(&db, "a", None).await.expect("Failed to search notes.");

	assert_eq!(unbounded.len(), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set NOOK_PG_DSN to run."]
async fn expired_notes_are_deleted_with_their_tags() {
	let Some(base_dsn) = nook_testkit::env_dsn() else {
		eprintln!("Skipping expired_notes_are_deleted_with_their_tags; set NOOK_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;
	let now = OffsetDateTime::now_utc();
	let expired = queries::insert_note(
		&db,
		&NewNote { expires_at: Some(now - Duration::minutes(1)), ..new_note("old", "stale") },
	)
	.await
	.expect("Failed to insert note.");
	let live = queries::insert_note(
		&db,
		&NewNote { expires_at: Some(now + Duration::hours(1)), ..new_note("new", "fresh") },
	)
	.await
	.expect("Failed to insert note.");
	let tag = queries::create_tag_if_absent(&db, "memory").await.expect("Failed to create tag.");

	queries::attach_tag(&db, expired.note_id, tag.tag_id).await.expect("Failed to attach tag.");

	let deleted = queries::delete_expired_notes(&db, now).await.expect("Failed to sweep.");

	assert_eq!(deleted, vec![expired.note_id]);
	assert!(matches!(queries::get_note(&db, expired.note_id).await, Err(Error::NotFound(_))));
	assert!(queries::get_note(&db, live.note_id).await.is_ok());
	assert!(
		queries::list_note_tags(&db, expired.note_id)
			.await
			.expect("Failed to list tags.")
			.is_empty()
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
