pub mod forget;
pub mod index;
pub mod memory;
pub mod recall;
pub mod remember;
pub mod store;
pub mod sweep;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use forget::{ForgetRequest, ForgetResponse};
pub use index::QdrantIndex;
pub use memory::Memory;
pub use recall::{RecallMethod, RecallRequest, RecallResponse};
pub use remember::RememberRequest;
pub use sweep::SweepResponse;

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;

use nook_config::{Config, EmbeddingProviderConfig};
use nook_providers::embedding;
use nook_storage::{
	db::Db,
	models::{NewNote, Note, Tag},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence capability the memory operations are written against.
///
/// Implemented for [`nook_storage::db::Db`] in [`store`]. Tests substitute an in-memory store.
pub trait NoteStore
where
	Self: Send + Sync,
{
	fn create_note<'a>(&'a self, note: &'a NewNote) -> BoxFuture<'a, Result<Note>>;

	/// Fails with [`Error::NotFound`] when no note has this id.
	fn get_note(&self, note_id: i64) -> BoxFuture<'_, Result<Note>>;

	fn delete_note(&self, note_id: i64) -> BoxFuture<'_, Result<()>>;

	/// Creating a name that already exists returns the existing tag unchanged.
	fn create_tag_if_absent<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Tag>>;

	fn attach_tag(&self, note_id: i64, tag_id: i64) -> BoxFuture<'_, Result<()>>;

	fn tags_of(&self, note_id: i64) -> BoxFuture<'_, Result<Vec<Tag>>>;

	fn notes_tagged_with<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Vec<Note>>>;

	/// Substring match on title or content, most recently updated first.
	fn search_text<'a>(
		&'a self,
		pattern: &'a str,
		limit: Option<u32>,
	) -> BoxFuture<'a, Result<Vec<Note>>>;

	/// Deletes every note whose expiry is at or before `now` and returns their ids.
	fn delete_expired_notes(&self, now: OffsetDateTime) -> BoxFuture<'_, Result<Vec<i64>>>;
}

/// Optional semantic index over notes.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	/// Candidates ordered by descending relevance.
	fn search<'a>(&'a self, query: &'a str, limit: u32) -> BoxFuture<'a, Result<Vec<IndexHit>>>;

	fn sync_note<'a>(
		&'a self,
		note_id: i64,
		title: &'a str,
		content: &'a str,
	) -> BoxFuture<'a, Result<()>>;

	fn delete(&self, note_id: i64) -> BoxFuture<'_, Result<()>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexHit {
	pub note_id: i64,
	pub score: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HttpEmbedding;
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

/// Remember, Recall, and Forget over an injected store and an optional vector index.
///
/// Holds no mutable state of its own, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct MemoryService {
	pub cfg: nook_config::Memory,
	pub store: Arc<dyn NoteStore>,
	pub index: Option<Arc<dyn VectorIndex>>,
}
impl MemoryService {
	pub fn new(cfg: nook_config::Memory, store: Arc<dyn NoteStore>) -> Self {
		Self { cfg, store, index: None }
	}

	pub fn with_index(
		cfg: nook_config::Memory,
		store: Arc<dyn NoteStore>,
		index: Arc<dyn VectorIndex>,
	) -> Self {
		Self { cfg, store, index: Some(index) }
	}

	/// Connects the Postgres store and, when configured, the Qdrant index.
	///
	/// An index whose collection cannot be prepared is still attached. Its failures are
	/// absorbed per operation.
	pub async fn connect(cfg: &Config) -> Result<Self> {
		let db = Db::connect(&cfg.storage.postgres).await?;

		db.ensure_schema().await?;

		let store: Arc<dyn NoteStore> = Arc::new(db);
		let (Some(qdrant_cfg), Some(embedding_cfg)) =
			(cfg.storage.qdrant.as_ref(), cfg.providers.embedding.as_ref())
		else {
			tracing::info!("No vector index configured. Recall uses keyword search only.");

			return Ok(Self::new(cfg.memory.clone(), store));
		};
		let index = QdrantIndex::new(QdrantStore::new(qdrant_cfg)?, embedding_cfg.clone());

		if let Err(err) = index.ensure_collection().await {
			tracing::warn!(error = %err, "Failed to prepare Qdrant collection.");
		}

		Ok(Self::with_index(cfg.memory.clone(), store, Arc::new(index)))
	}

	/// Reads a note with its tags as a [`Memory`], or `None` when it lacks the memory marker.
	pub(crate) async fn load_memory(
		&self,
		note: Note,
		score: Option<f32>,
	) -> Result<Option<Memory>> {
		let tags = self.store.tags_of(note.note_id).await?;

		Ok(Memory::from_note(note, tags, score))
	}
}
