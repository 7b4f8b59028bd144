//! The change feed: one live subscription to the ordered link collection, translated into [`ChangeEvent`]s.

use crate::{
	error::{BackendError, Error, Result},
	model::{ChangeEvent, ChangeKind, RawChange},
};
use core::fmt::{self, Debug};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	Ascending,
	Descending,
}
impl Direction {
	/// The direction string Firestore's `orderBy` expects.
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Direction::Ascending => "asc",
			Direction::Descending => "desc",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionQuery {
	pub collection: String,
	pub order_by: String,
	pub direction: Direction,
}
impl Default for CollectionQuery {
	fn default() -> Self {
		Self {
			collection: "links".to_owned(),
			order_by: "createdAt".to_owned(),
			direction: Direction::Descending,
		}
	}
}

/// How added items are positioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
	/// Insert at the backend-reported index. Keeps the grid in the backend's declared order.
	Indexed,
	/// Always append. Only correct for feeds that never insert anywhere but the end.
	Append,
}
impl Default for Placement {
	fn default() -> Self {
		Placement::Indexed
	}
}

/// One backend update: the changes since the previous one, or the subscription's failure.
pub type Delivery = Result<Vec<RawChange>, BackendError>;

/// Receives [`Delivery`]s in backend order. Must process them promptly; nothing is buffered on its behalf.
pub type DeliverySink = Box<dyn FnMut(Delivery)>;

/// An ordered, push-based source of collection changes.
pub trait ChangeSource {
	/// Starts delivering to `sink` until the returned [`Subscription`] is cancelled or dropped.
	///
	/// The first delivery contains the whole current result set as additions.
	fn subscribe(&self, query: &CollectionQuery, sink: DeliverySink) -> Subscription;
}

/// Handle to a live subscription. Dropping it unsubscribes.
#[must_use = "Dropping a `Subscription` unsubscribes immediately."]
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce()>>,
}
impl Subscription {
	pub fn new(cancel: impl 'static + FnOnce()) -> Self {
		Self { cancel: Some(Box::new(cancel)) }
	}

	/// A subscription with nothing to cancel, e.g. one that failed to start.
	pub fn inert() -> Self {
		Self { cancel: None }
	}

	#[must_use]
	pub fn is_active(&self) -> bool {
		self.cancel.is_some()
	}

	pub fn unsubscribe(mut self) {
		self.cancel();
	}

	fn cancel(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			trace!("Unsubscribing.");
			cancel()
		}
	}
}
impl Drop for Subscription {
	fn drop(&mut self) {
		self.cancel()
	}
}
impl Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("active", &self.is_active()).finish()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
	/// Subscribed, nothing delivered yet.
	Connecting,
	Live,
	/// The subscription failed. Terminal.
	Unavailable,
}

/// The events of one delivery, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedBatch {
	pub events: Vec<ChangeEvent>,
	/// Set on the first successful delivery only.
	pub initial_load: bool,
}

/// Translates raw deliveries into [`FeedBatch`]es and tracks the subscription's state.
#[derive(Debug)]
pub struct ChangeFeed {
	placement: Placement,
	state: FeedState,
}
impl ChangeFeed {
	#[must_use]
	pub fn new(placement: Placement) -> Self {
		Self {
			placement,
			state: FeedState::Connecting,
		}
	}

	#[must_use]
	pub fn state(&self) -> FeedState {
		self.state
	}

	#[must_use]
	pub fn placement(&self) -> Placement {
		self.placement
	}

	/// # Errors
	///
	/// [`Error::FeedUnavailable`] if `delivery` is a subscription failure.
	/// The feed stays unavailable afterwards and yields empty batches for anything still delivered.
	#[instrument(skip(delivery))]
	pub fn accept(&mut self, delivery: Delivery) -> Result<FeedBatch> {
		if self.state == FeedState::Unavailable {
			warn!("Ignoring a delivery on an unavailable feed.");
			return Ok(FeedBatch::default());
		}

		let changes = match delivery {
			Ok(changes) => changes,
			Err(error) => {
				self.state = FeedState::Unavailable;
				error!("Link feed failed (the backend may require an index): {}", error);
				return Err(Error::FeedUnavailable { detail: error.to_string() });
			}
		};

		let initial_load = self.state == FeedState::Connecting;
		self.state = FeedState::Live;

		let events = changes.into_iter().filter_map(|change| self.translate(change)).collect::<Vec<_>>();
		trace!(initial_load, "Delivery translated into {} event(s).", events.len());
		Ok(FeedBatch { events, initial_load })
	}

	fn translate(&self, change: RawChange) -> Option<ChangeEvent> {
		match change.kind {
			ChangeKind::Added => {
				let position_hint = match self.placement {
					Placement::Indexed => {
						if change.new_index.is_none() {
							warn!("Added link {} carries no index. Appending.", change.item.id);
						}
						change.new_index
					}
					Placement::Append => None,
				};
				Some(ChangeEvent::Added { item: change.item, position_hint })
			}
			ChangeKind::Removed => Some(ChangeEvent::Removed { id: change.item.id }),
			ChangeKind::Modified => {
				trace!("Ignoring modification of link {}.", change.item.id);
				None
			}
		}
	}
}
