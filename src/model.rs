//! Link records and the change events that describe how the backend's ordered result set evolves.

use core::{cmp::Ordering, fmt};
use serde::{Deserialize, Serialize};

/// Opaque, backend-assigned identifier of a link document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);
impl LinkId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl fmt::Display for LinkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
impl From<&str> for LinkId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}
impl From<String> for LinkId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// Server-assigned ordering timestamp, shaped like a Firestore `Timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
	pub seconds: i64,
	pub nanoseconds: u32,
}
impl Timestamp {
	#[must_use]
	pub fn new(seconds: i64, nanoseconds: u32) -> Self {
		Self { seconds, nanoseconds }
	}
}
impl Ord for Timestamp {
	fn cmp(&self, other: &Self) -> Ordering {
		self.seconds.cmp(&other.seconds).then(self.nanoseconds.cmp(&other.nanoseconds))
	}
}
impl PartialOrd for Timestamp {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// A saved link as rendered on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
	pub id: LinkId,
	pub title: String,
	pub url: String,
	/// [`None`] while the server hasn't committed the write yet.
	pub created_at: Option<Timestamp>,
}
impl LinkItem {
	pub fn new(id: impl Into<LinkId>, title: impl Into<String>, url: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			url: url.into(),
			created_at: None,
		}
	}

	#[must_use]
	pub fn created_at(mut self, created_at: Timestamp) -> Self {
		self.created_at = Some(created_at);
		self
	}
}

/// The document fields of a link, without its id.
///
/// Missing fields deserialize as empty, so that a malformed document still occupies its slot in the ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFields {
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub created_at: Option<Timestamp>,
}
impl LinkFields {
	#[must_use]
	pub fn into_item(self, id: LinkId) -> LinkItem {
		LinkItem {
			id,
			title: self.title,
			url: self.url,
			created_at: self.created_at,
		}
	}
}

/// The `type` of a backend document change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
	Added,
	Removed,
	Modified,
}

/// One backend document change, as delivered by a [`ChangeSource`](`crate::feed::ChangeSource`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
	pub kind: ChangeKind,
	pub item: LinkItem,
	/// The item's index in the full ordering after this change. Absent for removals.
	pub new_index: Option<usize>,
}
impl RawChange {
	#[must_use]
	pub fn added(item: LinkItem, new_index: usize) -> Self {
		Self {
			kind: ChangeKind::Added,
			item,
			new_index: Some(new_index),
		}
	}

	#[must_use]
	pub fn removed(item: LinkItem) -> Self {
		Self {
			kind: ChangeKind::Removed,
			item,
			new_index: None,
		}
	}

	#[must_use]
	pub fn modified(item: LinkItem, new_index: usize) -> Self {
		Self {
			kind: ChangeKind::Modified,
			item,
			new_index: Some(new_index),
		}
	}
}

/// A typed operation for the [`Reconciler`](`crate::reconcile::Reconciler`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
	Added {
		item: LinkItem,
		/// Zero-based index in the current full ordering, or [`None`] to append.
		position_hint: Option<usize>,
	},
	Removed {
		id: LinkId,
	},
}
impl ChangeEvent {
	#[must_use]
	pub fn id(&self) -> &LinkId {
		match self {
			ChangeEvent::Added { item, .. } => &item.id,
			ChangeEvent::Removed { id } => id,
		}
	}
}

/// A create request, before the server has assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLink {
	pub title: String,
	pub url: String,
}
