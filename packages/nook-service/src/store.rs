use time::OffsetDateTime;

use crate::{BoxFuture, NoteStore, Result};
use nook_storage::{
	db::Db,
	models::{NewNote, Note, Tag},
	queries,
};

impl NoteStore for Db {
	fn create_note<'a>(&'a self, note: &'a NewNote) -> BoxFuture<'a, Result<Note>> {
		Box::pin(async move { Ok(queries::insert_note(self, note).await?) })
	}

	fn get_note(&self, note_id: i64) -> BoxFuture<'_, Result<Note>> {
		Box::pin(async move { Ok(queries::get_note(self, note_id).await?) })
	}

	fn delete_note(&self, note_id: i64) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(queries::delete_note(self, note_id).await?) })
	}

	fn create_tag_if_absent<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Tag>> {
		Box::pin(async move { Ok(queries::create_tag_if_absent(self, name).await?) })
	}

	fn attach_tag(&self, note_id: i64, tag_id: i64) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(queries::attach_tag(self, note_id, tag_id).await?) })
	}

	fn tags_of(&self, note_id: i64) -> BoxFuture<'_, Result<Vec<Tag>>> {
		Box::pin(async move { Ok(queries::list_note_tags(self, note_id).await?) })
	}

	fn notes_tagged_with<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<Note>>> {
		Box::pin(async move { Ok(queries::list_notes_by_tag(self, name).await?) })
	}

	fn search_text<'a>(
		&'a self,
		pattern: &'a str,
		limit: Option<u32>,
	) -> BoxFuture<'a, Result<Vec<Note>>> {
		Box::pin(async move {
			Ok(queries::search_notes_text(self, pattern, limit.map(i64::from)).await?)
		})
	}

	fn delete_expired_notes(&self, now: OffsetDateTime) -> BoxFuture<'_, Result<Vec<i64>>> {
		Box::pin(async move { Ok(queries::delete_expired_notes(self, now).await?) })
	}
}
