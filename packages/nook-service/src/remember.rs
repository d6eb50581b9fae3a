use time::{Duration, OffsetDateTime};

use crate::{Error, Memory, MemoryService, Result};
use nook_domain::{codec, memory_policy, ttl};
use nook_storage::models::NewNote;

#[derive(Clone, Debug, Default)]
pub struct RememberRequest {
	pub content: String,
	pub title: Option<String>,
	pub category: Option<String>,
	pub importance: Option<i32>,
	/// Non-positive durations are treated as no expiry.
	pub ttl: Option<Duration>,
	pub source: Option<String>,
	pub source_ref: Option<String>,
}

impl MemoryService {
	pub async fn remember(&self, req: RememberRequest) -> Result<Memory> {
		if req.content.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "content is required.".to_string() });
		}

		let now = OffsetDateTime::now_utc();
		let category = memory_policy::resolve_category(req.category.as_deref());

		if !memory_policy::is_known_category(&category) {
			tracing::warn!(category = %category, "Storing memory with an unrecognized category.");
		}

		let importance = memory_policy::resolve_importance(req.importance);
		let new_note = NewNote {
			title: memory_policy::resolve_title(req.title.as_deref(), &req.content),
			content: req.content,
			folder: None,
			expires_at: ttl::compute_expires_at(req.ttl, now),
			source: non_blank(req.source),
			source_ref: non_blank(req.source_ref),
		};
		let note = self.store.create_note(&new_note).await?;
		let mut tags = Vec::with_capacity(3);

		for name in codec::encode(&category, importance) {
			let tag = self.store.create_tag_if_absent(&name).await?;

			self.store.attach_tag(note.note_id, tag.tag_id).await?;

			tags.push(tag);
		}

		if let Some(index) = &self.index
			&& let Err(err) = index.sync_note(note.note_id, &note.title, &note.content).await
		{
			tracing::warn!(note_id = note.note_id, error = %err, "Vector index sync failed.");
		}

		let note_id = note.note_id;

		Memory::from_note(note, tags, None).ok_or_else(|| Error::Storage {
			message: format!("Memory marker missing on note {note_id} after tagging."),
		})
	}
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}
