use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{MemoryService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepResponse {
	pub deleted: usize,
}

impl MemoryService {
	/// Deletes expired notes and drops their vectors from the index when one is configured.
	///
	/// Vector deletions are best effort. Store failures are returned.
	pub async fn sweep_expired(&self) -> Result<SweepResponse> {
		let now = OffsetDateTime::now_utc();
		let note_ids = self.store.delete_expired_notes(now).await?;

		if note_ids.is_empty() {
			return Ok(SweepResponse { deleted: 0 });
		}

		tracing::info!(deleted = note_ids.len(), "Swept expired notes.");

		if let Some(index) = &self.index {
			for note_id in &note_ids {
				if let Err(err) = index.delete(*note_id).await {
					tracing::warn!(
						note_id = *note_id,
						error = %err,
						"Vector index delete failed for expired note."
					);
				}
			}
		}

		Ok(SweepResponse { deleted: note_ids.len() })
	}
}
