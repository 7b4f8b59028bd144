//! An in-memory realtime collection, ordered by creation time (newest first).
//!
//! Changes are queued per subscriber and only delivered on [`MemoryCollection::flush`], the way a network-backed store
//! delivers them some time after the write.

use crate::{
	error::BackendError,
	feed::{ChangeSource, CollectionQuery, Delivery, DeliverySink, Subscription},
	gateway::LinkStore,
	model::{LinkId, LinkItem, NewLink, RawChange, Timestamp},
};
use async_trait::async_trait;
use core::mem;
use std::{
	cell::RefCell,
	collections::BTreeMap,
	rc::{Rc, Weak},
};
use tracing::{debug, error, trace};

struct Subscriber {
	sink: Rc<RefCell<DeliverySink>>,
	pending: Vec<RawChange>,
	failure: Option<BackendError>,
	/// Whether anything (even an empty snapshot) is waiting to be delivered.
	dirty: bool,
}

#[derive(Default)]
struct Inner {
	/// Newest first.
	docs: Vec<LinkItem>,
	subscribers: BTreeMap<u64, Subscriber>,
	next_subscriber: u64,
	next_id: u64,
	clock: i64,
	subscribe_failure: Option<BackendError>,
	write_failure: Option<BackendError>,
}
impl Inner {
	fn broadcast(&mut self, change: &RawChange) {
		for subscriber in self.subscribers.values_mut() {
			subscriber.pending.push(change.clone());
			subscriber.dirty = true;
		}
	}

	fn check_writable(&self) -> Result<(), BackendError> {
		match &self.write_failure {
			Some(failure) => Err(failure.clone()),
			None => Ok(()),
		}
	}
}

/// Cheaply cloneable handle to a shared in-memory collection.
#[derive(Clone, Default)]
pub struct MemoryCollection {
	inner: Rc<RefCell<Inner>>,
}
impl MemoryCollection {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// The documents in query order.
	#[must_use]
	pub fn docs(&self) -> Vec<LinkItem> {
		self.inner.borrow().docs.clone()
	}

	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.inner.borrow().subscribers.len()
	}

	/// Makes the next subscription fail on its first delivery, e.g. as if a required index was missing.
	pub fn fail_next_subscription(&self, error: BackendError) {
		self.inner.borrow_mut().subscribe_failure = Some(error);
	}

	/// Makes writes fail with `error` until called with [`None`].
	pub fn fail_writes(&self, error: Option<BackendError>) {
		self.inner.borrow_mut().write_failure = error;
	}

	/// Inserts a link with the next server timestamp.
	///
	/// # Errors
	///
	/// The error set by [`MemoryCollection::fail_writes`].
	pub fn insert(&self, link: NewLink) -> Result<LinkId, BackendError> {
		let mut inner = self.inner.borrow_mut();
		inner.check_writable()?;

		inner.clock += 1;
		inner.next_id += 1;
		let created_at = Timestamp::new(inner.clock, 0);
		let item = LinkItem::new(format!("link-{}", inner.next_id), link.title, link.url).created_at(created_at);
		let id = item.id.clone();

		let index = inner.docs.iter().position(|doc| doc.created_at < Some(created_at)).unwrap_or(inner.docs.len());
		inner.docs.insert(index, item.clone());
		inner.broadcast(&RawChange::added(item, index));
		debug!("Inserted {} at {}.", id, index);
		Ok(id)
	}

	/// Removes `id`. Removing a missing document succeeds without a change.
	///
	/// # Errors
	///
	/// The error set by [`MemoryCollection::fail_writes`].
	pub fn remove(&self, id: &LinkId) -> Result<(), BackendError> {
		let mut inner = self.inner.borrow_mut();
		inner.check_writable()?;

		match inner.docs.iter().position(|doc| &doc.id == id) {
			Some(index) => {
				let item = inner.docs.remove(index);
				inner.broadcast(&RawChange::removed(item));
				debug!("Removed {}.", id);
			}
			None => trace!("Nothing to remove for {}.", id),
		}
		Ok(())
	}

	/// Changes the title of `id` in place. Subscribers see a `modified` change.
	///
	/// # Errors
	///
	/// The error set by [`MemoryCollection::fail_writes`], or if there's no such document.
	pub fn retitle(&self, id: &LinkId, title: impl Into<String>) -> Result<(), BackendError> {
		let mut inner = self.inner.borrow_mut();
		inner.check_writable()?;

		let index = inner.docs.iter().position(|doc| &doc.id == id).ok_or_else(|| BackendError::with_code("not-found", format!("No document {}", id)))?;
		inner.docs[index].title = title.into();
		let item = inner.docs[index].clone();
		inner.broadcast(&RawChange::modified(item, index));
		Ok(())
	}

	/// Delivers every subscriber's pending changes as one batch each. Returns the number of deliveries.
	///
	/// Failed subscriptions are dropped after their failure is delivered.
	pub fn flush(&self) -> usize {
		let deliveries: Vec<(Rc<RefCell<DeliverySink>>, Delivery)> = {
			let mut inner = self.inner.borrow_mut();
			let mut deliveries = Vec::new();
			inner.subscribers.retain(|_, subscriber| {
				if !subscriber.dirty {
					return true;
				}
				subscriber.dirty = false;
				match subscriber.failure.take() {
					Some(failure) => {
						deliveries.push((subscriber.sink.clone(), Err(failure)));
						false
					}
					None => {
						deliveries.push((subscriber.sink.clone(), Ok(mem::take(&mut subscriber.pending))));
						true
					}
				}
			});
			deliveries
		};

		let count = deliveries.len();
		for (sink, delivery) in deliveries {
			match sink.try_borrow_mut() {
				Ok(mut sink) => (*sink)(delivery),
				Err(_) => error!("Subscriber is busy. A re-entrant delivery was dropped."),
			}
		}
		count
	}
}
impl ChangeSource for MemoryCollection {
	fn subscribe(&self, query: &CollectionQuery, sink: DeliverySink) -> Subscription {
		let mut inner = self.inner.borrow_mut();
		let key = inner.next_subscriber;
		inner.next_subscriber += 1;

		let failure = inner.subscribe_failure.take();
		let pending = if failure.is_some() {
			Vec::new()
		} else {
			inner.docs.iter().enumerate().map(|(index, doc)| RawChange::added(doc.clone(), index)).collect()
		};
		debug!(?query, "Subscriber {} added with {} initial document(s).", key, pending.len());
		inner.subscribers.insert(
			key,
			Subscriber {
				sink: Rc::new(RefCell::new(sink)),
				pending,
				failure,
				dirty: true,
			},
		);

		drop(inner);

		let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = weak.upgrade() {
				match inner.try_borrow_mut() {
					Ok(mut inner) => {
						inner.subscribers.remove(&key);
					}
					Err(_) => error!("Collection is busy. Subscriber {} could not be removed.", key),
				}
			}
		})
	}
}

#[async_trait(?Send)]
impl LinkStore for MemoryCollection {
	async fn create(&self, link: NewLink) -> Result<LinkId, BackendError> {
		self.insert(link)
	}

	async fn delete(&self, id: &LinkId) -> Result<(), BackendError> {
		self.remove(id)
	}
}
