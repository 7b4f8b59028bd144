use crate::model::LinkId;
use thiserror::Error;

/// A failure reported by the backend store or its change subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", .code.as_deref().map(|code| format!("[{code}] ")).unwrap_or_default())]
pub struct BackendError {
	/// Backend-specific error code, e.g. `failed-precondition` for a missing index.
	pub code: Option<String>,
	pub message: String,
}
impl BackendError {
	pub fn new(message: impl Into<String>) -> Self {
		Self { code: None, message: message.into() }
	}

	pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			code: Some(code.into()),
			message: message.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// The change subscription failed. Fatal for the session; never retried.
	#[error("link feed unavailable: {detail}")]
	FeedUnavailable { detail: String },

	/// The create request was rejected. The entry form stays open.
	#[error("failed to add link: {0}")]
	SubmissionFailed(#[source] BackendError),

	/// The delete request was rejected. The link stays on the grid.
	#[error("failed to delete link {id}: {source}")]
	DeleteFailed { id: LinkId, source: BackendError },

	/// Never surfaced to the user; the fallback icon is shown instead.
	#[error("favicon for {url:?} could not be loaded")]
	FaviconLoadFailed { url: String },

	/// The change feed announced a link that is already on the grid.
	#[error("link {0} was added twice")]
	DuplicateLink(LinkId),

	#[error("invalid link: {0}")]
	InvalidSubmission(&'static str),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
