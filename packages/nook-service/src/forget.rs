use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, Memory, MemoryService, Result, remember::non_blank};
use nook_domain::codec::MEMORY_TAG;

#[derive(Clone, Debug, Default)]
pub struct ForgetRequest {
	/// Minimum age in days, compared against fractional days since creation.
	pub older_than_days: Option<f64>,
	/// Only memories with importance strictly below this value are selected.
	pub importance_below: Option<i32>,
	pub category: Option<String>,
	pub query: Option<String>,
	/// Selects exactly this memory. Every other filter is ignored.
	pub id: Option<i64>,
	pub dry_run: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForgetResponse {
	pub dry_run: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub deleted: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub would_delete: Option<usize>,
	pub memories: Vec<Memory>,
}

struct Filters {
	older_than_days: Option<f64>,
	importance_below: Option<i32>,
	category: Option<String>,
	query: Option<String>,
}
impl Filters {
	fn is_empty(&self) -> bool {
		self.older_than_days.is_none()
			&& self.importance_below.is_none()
			&& self.category.is_none()
			&& self.query.is_none()
	}

	fn keeps(&self, memory: &Memory, now: OffsetDateTime) -> bool {
		if let Some(days) = self.older_than_days
			&& memory.age_days(now) < days
		{
			return false;
		}
		if let Some(category) = &self.category
			&& &memory.category != category
		{
			return false;
		}
		if let Some(ceiling) = self.importance_below
			&& memory.importance >= ceiling
		{
			return false;
		}

		true
	}
}

impl MemoryService {
	/// Selects memories by identity or by combined filters and deletes them.
	///
	/// A request with no criteria at all always runs as a dry run. Deletion failures for a
	/// single memory are logged and left out of the result.
	pub async fn forget(&self, req: ForgetRequest) -> Result<ForgetResponse> {
		if let Some(days) = req.older_than_days
			&& !days.is_finite()
		{
			return Err(Error::InvalidRequest {
				message: "older_than_days must be a finite number.".to_string(),
			});
		}

		let filters = Filters {
			older_than_days: req.older_than_days,
			importance_below: req.importance_below,
			category: non_blank(req.category),
			query: non_blank(req.query),
		};
		let unconstrained = req.id.is_none() && filters.is_empty();
		let dry_run = req.dry_run || unconstrained;

		if unconstrained && !req.dry_run {
			tracing::info!("Forget request has no criteria. Running as a dry run.");
		}

		let candidates = match req.id {
			Some(note_id) => vec![self.memory_by_id(note_id).await?],
			None => self.select_candidates(&filters).await?,
		};

		if dry_run {
			return Ok(ForgetResponse {
				dry_run: true,
				deleted: None,
				would_delete: Some(candidates.len()),
				memories: candidates,
			});
		}

		let mut deleted = Vec::with_capacity(candidates.len());

		for memory in candidates {
			if let Some(index) = &self.index
				&& let Err(err) = index.delete(memory.id).await
			{
				tracing::warn!(note_id = memory.id, error = %err, "Vector index delete failed.");
			}

			match self.store.delete_note(memory.id).await {
				Ok(()) => deleted.push(memory),
				Err(err) => {
					tracing::warn!(note_id = memory.id, error = %err, "Failed to delete memory.");
				},
			}
		}

		Ok(ForgetResponse {
			dry_run: false,
			deleted: Some(deleted.len()),
			would_delete: None,
			memories: deleted,
		})
	}

	async fn memory_by_id(&self, note_id: i64) -> Result<Memory> {
		let note = self.store.get_note(note_id).await?;

		self.load_memory(note, None)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("note {note_id} is not a memory.") })
	}

	async fn select_candidates(&self, filters: &Filters) -> Result<Vec<Memory>> {
		let now = OffsetDateTime::now_utc();
		let notes = match filters.query.as_deref() {
			Some(query) => self.store.search_text(query, None).await?,
			None => self.store.notes_tagged_with(MEMORY_TAG).await?,
		};
		let mut out = Vec::new();

		for note in notes {
			if let Some(memory) = self.load_memory(note, None).await?
				&& filters.keeps(&memory, now)
			{
				out.push(memory);
			}
		}

		Ok(out)
	}
}
