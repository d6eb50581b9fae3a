use std::sync::Arc;

use qdrant_client::{
	Payload, QdrantError,
	qdrant::{
		CreateCollectionBuilder, DeletePointsBuilder, Distance, PointId, PointStruct,
		PointsIdsList, Query, QueryPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
		point_id::PointIdOptions,
	},
};

use crate::{BoxFuture, EmbeddingProvider, Error, HttpEmbedding, IndexHit, Result, VectorIndex};
use nook_config::EmbeddingProviderConfig;
use nook_domain::memory_policy;
use nook_storage::qdrant::QdrantStore;

/// [`VectorIndex`] backed by a Qdrant collection with one point per note.
///
/// Point ids are the note ids, so syncing a note twice overwrites its vector.
pub struct QdrantIndex {
	pub qdrant: QdrantStore,
	pub embedding: EmbeddingProviderConfig,
	pub provider: Arc<dyn EmbeddingProvider>,
}
impl QdrantIndex {
	pub fn new(qdrant: QdrantStore, embedding: EmbeddingProviderConfig) -> Self {
		Self { qdrant, embedding, provider: Arc::new(HttpEmbedding) }
	}

	pub fn with_provider(
		qdrant: QdrantStore,
		embedding: EmbeddingProviderConfig,
		provider: Arc<dyn EmbeddingProvider>,
	) -> Self {
		Self { qdrant, embedding, provider }
	}

	/// Creates the cosine collection when it does not exist yet.
	pub async fn ensure_collection(&self) -> Result<()> {
		let collection = self.qdrant.collection.clone();

		if self.qdrant.client.collection_exists(collection.clone()).await? {
			return Ok(());
		}

		self.qdrant
			.client
			.create_collection(CreateCollectionBuilder::new(collection.clone()).vectors_config(
				VectorParamsBuilder::new(u64::from(self.qdrant.vector_dim), Distance::Cosine),
			))
			.await?;

		tracing::info!(collection = %collection, "Created Qdrant collection.");

		Ok(())
	}

	async fn embed_one(&self, text: String) -> Result<Vec<f32>> {
		let vectors = self.provider.embed(&self.embedding, &[text]).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}

impl VectorIndex for QdrantIndex {
	fn search<'a>(&'a self, query: &'a str, limit: u32) -> BoxFuture<'a, Result<Vec<IndexHit>>> {
		Box::pin(async move {
			let vector = self.embed_one(query.to_string()).await?;
			let search = QueryPointsBuilder::new(self.qdrant.collection.clone())
				.query(Query::new_nearest(vector))
				.limit(u64::from(limit));
			let response = self.qdrant.client.query(search).await?;
			let hits = response
				.result
				.into_iter()
				.filter_map(|point| {
					let note_id = point_note_id(point.id.as_ref())?;

					Some(IndexHit { note_id, score: point.score })
				})
				.collect();

			Ok(hits)
		})
	}

	fn sync_note<'a>(
		&'a self,
		note_id: i64,
		title: &'a str,
		content: &'a str,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let point_id = point_id(note_id)?;
			let vector = self.embed_one(memory_policy::embedding_input(title, content)).await?;
			let mut payload = Payload::new();

			payload.insert("note_id", note_id);
			payload.insert("title", title.to_string());

			let point = PointStruct::new(point_id, vector, payload);

			self.qdrant
				.client
				.upsert_points(
					UpsertPointsBuilder::new(self.qdrant.collection.clone(), vec![point]).wait(true),
				)
				.await?;

			Ok(())
		})
	}

	fn delete(&self, note_id: i64) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move {
			let point_id = point_id(note_id)?;
			let delete = DeletePointsBuilder::new(self.qdrant.collection.clone())
				.points(PointsIdsList { ids: vec![PointId::from(point_id)] })
				.wait(true);

			match self.qdrant.client.delete_points(delete).await {
				Ok(_) => Ok(()),
				Err(err) if is_not_found_error(&err) => {
					tracing::info!(note_id, "Qdrant point missing during delete.");

					Ok(())
				},
				Err(err) => Err(err.into()),
			}
		})
	}
}

fn point_id(note_id: i64) -> Result<u64> {
	u64::try_from(note_id).map_err(|_| Error::InvalidRequest {
		message: format!("note id {note_id} cannot be used as a point id."),
	})
}

fn point_note_id(id: Option<&PointId>) -> Option<i64> {
	match id?.point_id_options.as_ref()? {
		PointIdOptions::Num(value) => i64::try_from(*value).ok(),
		PointIdOptions::Uuid(_) => None,
	}
}

fn is_not_found_error(err: &QdrantError) -> bool {
	let message = err.to_string().to_lowercase();
	let point_not_found =
		(message.contains("not found") || message.contains("404")) && message.contains("point");
	let no_point_found = message.contains("no point") && message.contains("found");

	point_not_found || no_point_found
}
