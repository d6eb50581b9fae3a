use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use nook_domain::{codec, memory_policy};
use nook_storage::models::{Note, Tag};

/// A note carrying the memory marker, with its category and importance decoded from tags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Memory {
	pub id: i64,
	pub title: String,
	pub content: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub folder: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
	#[serde(default, with = "crate::time_serde::option")]
	pub expires_at: Option<OffsetDateTime>,
	pub source: Option<String>,
	pub source_ref: Option<String>,
	pub tags: Vec<String>,
	pub category: String,
	pub importance: i32,
	/// Relevance from the vector index. Only set on semantic recall results.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score: Option<f32>,
}
impl Memory {
	/// Returns `None` when `tags` lack the memory marker.
	///
	/// A missing category reads back as the default category and an importance outside `1..=5`
	/// reads back as the default importance.
	pub fn from_note(note: Note, tags: Vec<Tag>, score: Option<f32>) -> Option<Self> {
		let mut tags = tags.into_iter().map(|tag| tag.name).collect::<Vec<_>>();
		let decoded = codec::decode(&tags);

		if !decoded.is_memory {
			return None;
		}

		tags.sort();
		tags.dedup();

		let category = memory_policy::resolve_category(Some(decoded.category.as_str()));
		let importance = memory_policy::resolve_importance(Some(decoded.importance));

		Some(Self {
			id: note.note_id,
			title: note.title,
			content: note.content,
			folder: note.folder,
			created_at: note.created_at,
			updated_at: note.updated_at,
			expires_at: note.expires_at,
			source: note.source,
			source_ref: note.source_ref,
			tags,
			category,
			importance,
			score,
		})
	}

	/// Age in fractional days at `now`.
	pub fn age_days(&self, now: OffsetDateTime) -> f64 {
		(now - self.created_at).as_seconds_f64() / 86_400.0
	}
}
