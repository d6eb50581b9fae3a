use sqlx::{Executor, Postgres};
use time::OffsetDateTime;

use crate::{
	Error, Result,
	db::Db,
	models::{NewNote, Note, Tag},
};

const NOTE_COLUMNS: &str = "\
notes.note_id,
	notes.title,
	notes.content,
	notes.folder,
	notes.created_at,
	notes.updated_at,
	notes.expires_at,
	notes.source,
	notes.source_ref";

pub async fn insert_note(db: &Db, note: &NewNote) -> Result<Note> {
	let sql = format!(
		"\
INSERT INTO notes (title, content, folder, expires_at, source, source_ref)
VALUES ($1, $2, $3, $4, $5, $6)
RETURNING {NOTE_COLUMNS}"
	);
	let row = sqlx::query_as::<_, Note>(&sql)
		.bind(note.title.as_str())
		.bind(note.content.as_str())
		.bind(note.folder.as_deref())
		.bind(note.expires_at)
		.bind(note.source.as_deref())
		.bind(note.source_ref.as_deref())
		.fetch_one(&db.pool)
		.await?;

	Ok(row)
}

pub async fn fetch_note(db: &Db, note_id: i64) -> Result<Option<Note>> {
	let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE notes.note_id = $1");
	let row = sqlx::query_as::<_, Note>(&sql).bind(note_id).fetch_optional(&db.pool).await?;

	Ok(row)
}

pub async fn get_note(db: &Db, note_id: i64) -> Result<Note> {
	fetch_note(db, note_id).await?.ok_or_else(|| Error::NotFound(format!("note {note_id}")))
}

pub async fn delete_note(db: &Db, note_id: i64) -> Result<()> {
	let result = sqlx::query("DELETE FROM notes WHERE note_id = $1")
		.bind(note_id)
		.execute(&db.pool)
		.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("note {note_id}")));
	}

	Ok(())
}

/// Returns the existing row unchanged when `name` is already taken.
pub async fn create_tag_if_absent(db: &Db, name: &str) -> Result<Tag> {
	if name.trim().is_empty() {
		return Err(Error::InvalidArgument("Tag name must be non-empty.".to_string()));
	}

	let inserted = sqlx::query_as::<_, Tag>(
		"\
INSERT INTO tags (name)
VALUES ($1)
ON CONFLICT (name) DO NOTHING
RETURNING tag_id, name",
	)
	.bind(name)
	.fetch_optional(&db.pool)
	.await?;

	if let Some(tag) = inserted {
		return Ok(tag);
	}

	fetch_tag_by_name(&db.pool, name)
		.await?
		.ok_or_else(|| Error::NotFound(format!("tag {name:?}")))
}

pub async fn attach_tag(db: &Db, note_id: i64, tag_id: i64) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO note_tags (note_id, tag_id)
VALUES ($1, $2)
ON CONFLICT (note_id, tag_id) DO NOTHING",
	)
	.bind(note_id)
	.bind(tag_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn list_note_tags(db: &Db, note_id: i64) -> Result<Vec<Tag>> {
	let rows = sqlx::query_as::<_, Tag>(
		"\
SELECT tags.tag_id, tags.name
FROM tags
JOIN note_tags ON note_tags.tag_id = tags.tag_id
WHERE note_tags.note_id = $1
ORDER BY tags.tag_id",
	)
	.bind(note_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn list_notes_by_tag(db: &Db, tag_name: &str) -> Result<Vec<Note>> {
	let sql = format!(
		"\
SELECT {NOTE_COLUMNS}
FROM notes
JOIN note_tags ON note_tags.note_id = notes.note_id
JOIN tags ON tags.tag_id = note_tags.tag_id
WHERE tags.name = $1
ORDER BY notes.updated_at DESC, notes.note_id DESC"
	);
	let rows = sqlx::query_as::<_, Note>(&sql).bind(tag_name).fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Case-insensitive substring match on title or content, most recently updated first.
///
/// `limit = None` returns every match.
pub async fn search_notes_text(db: &Db, pattern: &str, limit: Option<i64>) -> Result<Vec<Note>> {
	let sql = format!(
		"\
SELECT {NOTE_COLUMNS}
FROM notes
WHERE notes.title ILIKE $1 ESCAPE '\\' OR notes.content ILIKE $1 ESCAPE '\\'
ORDER BY notes.updated_at DESC, notes.note_id DESC
LIMIT $2"
	);
	let rows = sqlx::query_as::<_, Note>(&sql)
		.bind(like_pattern(pattern))
		.bind(limit)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

pub async fn delete_expired_notes(db: &Db, now: OffsetDateTime) -> Result<Vec<i64>> {
	let ids: Vec<i64> = sqlx::query_scalar(
		"\
DELETE FROM notes
WHERE expires_at IS NOT NULL AND expires_at <= $1
RETURNING note_id",
	)
	.bind(now)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}

pub fn like_pattern(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len() + 2);

	out.push('%');

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}

async fn fetch_tag_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Tag>>
where
	E: Executor<'e, Database = Postgres>,
{
	let row = sqlx::query_as::<_, Tag>("SELECT tag_id, name FROM tags WHERE name = $1")
		.bind(name)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn like_pattern_escapes_wildcards() {
		assert_eq!(like_pattern("snake_case"), "%snake\\_case%");
		assert_eq!(like_pattern("100%"), "%100\\%%");
		assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
		assert_eq!(like_pattern(""), "%%");
	}
}
