pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl Error {
	/// Errors a caller caused and can fix by changing the request.
	pub fn is_caller_error(&self) -> bool {
		matches!(self, Self::InvalidRequest { .. } | Self::NotFound { .. })
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<nook_storage::Error> for Error {
	fn from(err: nook_storage::Error) -> Self {
		match err {
			nook_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			nook_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			nook_storage::Error::NotFound(message) => Self::NotFound { message },
			nook_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<nook_providers::Error> for Error {
	fn from(err: nook_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant { message: err.to_string() }
	}
}
