use time::OffsetDateTime;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Note {
	pub note_id: i64,
	pub title: String,
	pub content: String,
	pub folder: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub expires_at: Option<OffsetDateTime>,
	pub source: Option<String>,
	pub source_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct Tag {
	pub tag_id: i64,
	pub name: String,
}

/// Fields a caller controls when creating a note. Identity and timestamps come from the store.
#[derive(Clone, Debug, Default)]
pub struct NewNote {
	pub title: String,
	pub content: String,
	pub folder: Option<String>,
	pub expires_at: Option<OffsetDateTime>,
	pub source: Option<String>,
	pub source_ref: Option<String>,
}
