use serde::{Deserialize, Serialize};

use crate::{Error, IndexHit, Memory, MemoryService, Result};
use nook_storage::models::Note;

#[derive(Clone, Debug, Default)]
pub struct RecallRequest {
	pub query: String,
	/// Falls back to the configured recall limit when unset or zero.
	pub limit: Option<u32>,
	pub category: Option<String>,
	/// Falls back to the configured preference when unset.
	pub use_semantic: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecallMethod {
	Semantic,
	Keyword,
}
impl RecallMethod {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Semantic => "semantic",
			Self::Keyword => "keyword",
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecallResponse {
	pub query: String,
	pub method: RecallMethod,
	pub count: usize,
	pub memories: Vec<Memory>,
}

enum Candidates {
	Semantic(Vec<IndexHit>),
	Keyword(Vec<Note>),
}
impl Candidates {
	fn method(&self) -> RecallMethod {
		match self {
			Self::Semantic(_) => RecallMethod::Semantic,
			Self::Keyword(_) => RecallMethod::Keyword,
		}
	}
}

impl MemoryService {
	/// Sweeps expired notes, then searches the vector index with a keyword fallback.
	///
	/// The semantic result is only kept when at least one candidate survives filtering. Index
	/// failures are logged and fall through to the keyword search.
	pub async fn recall(&self, req: RecallRequest) -> Result<RecallResponse> {
		let query = req.query.as_str();

		if query.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "query is required.".to_string() });
		}

		let limit = req.limit.filter(|limit| *limit > 0).unwrap_or(self.cfg.recall_limit) as usize;
		let fetch_limit = u32::try_from(limit.saturating_mul(2)).unwrap_or(u32::MAX);
		let category = req.category.as_deref().map(str::trim).filter(|value| !value.is_empty());
		let use_semantic = req.use_semantic.unwrap_or(self.cfg.prefer_semantic);

		self.sweep_expired().await?;

		if use_semantic && let Some(index) = &self.index {
			match index.search(query, fetch_limit).await {
				Ok(hits) => {
					let memories =
						self.select_memories(Candidates::Semantic(hits), category, limit).await?;

					if !memories.is_empty() {
						return Ok(build_response(query, RecallMethod::Semantic, memories));
					}

					tracing::debug!(query, "Semantic recall had no memory matches.");
				},
				Err(err) => {
					tracing::warn!(
						error = %err,
						"Vector index search failed. Falling back to keyword search."
					);
				},
			}
		}

		let notes = self.store.search_text(query, Some(fetch_limit)).await?;
		let memories = self.select_memories(Candidates::Keyword(notes), category, limit).await?;

		Ok(build_response(query, RecallMethod::Keyword, memories))
	}

	/// Keeps memories matching `category` in candidate order, stopping at `limit`.
	///
	/// Semantic candidates that fail to load are skipped. Keyword candidates come from the
	/// store directly, so a failure there is returned.
	async fn select_memories(
		&self,
		candidates: Candidates,
		category: Option<&str>,
		limit: usize,
	) -> Result<Vec<Memory>> {
		let method = candidates.method();
		let mut out = Vec::new();

		match candidates {
			Candidates::Semantic(hits) =>
				for hit in hits {
					if out.len() >= limit {
						break;
					}

					let loaded = match self.store.get_note(hit.note_id).await {
						Ok(note) => self.load_memory(note, Some(hit.score)).await,
						Err(err) => Err(err),
					};

					match loaded {
						Ok(Some(memory)) => push_if_matches(&mut out, memory, category),
						Ok(None) => {},
						Err(err) => tracing::warn!(
							note_id = hit.note_id,
							method = method.as_str(),
							error = %err,
							"Skipping recall candidate."
						),
					}
				},
			Candidates::Keyword(notes) =>
				for note in notes {
					if out.len() >= limit {
						break;
					}
					if let Some(memory) = self.load_memory(note, None).await? {
						push_if_matches(&mut out, memory, category);
					}
				},
		}

		tracing::debug!(method = method.as_str(), count = out.len(), "Recall candidates selected.");

		Ok(out)
	}
}

fn push_if_matches(out: &mut Vec<Memory>, memory: Memory, category: Option<&str>) {
	if category.is_none_or(|category| memory.category == category) {
		out.push(memory);
	}
}

fn build_response(query: &str, method: RecallMethod, memories: Vec<Memory>) -> RecallResponse {
	RecallResponse { query: query.to_string(), method, count: memories.len(), memories }
}
