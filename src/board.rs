//! The page's link grid: change feed, reconciler and search filter wired together around one [`ViewState`].

use crate::{
	config::BoardConfig,
	error::{Error, Result},
	feed::{ChangeFeed, ChangeSource, CollectionQuery, Delivery, Subscription},
	reconcile::{HostSignal, Reconciler, ViewHost},
	search,
	theme::Theme,
	view_state::{LoadState, ViewState},
};
use std::{cell::RefCell, rc::Rc};
use tracing::{error, info, instrument, trace};

pub struct Board<H: ViewHost> {
	reconciler: Reconciler<H>,
	feed: ChangeFeed,
	view: ViewState,
	subscription: Option<Subscription>,
}
impl<H: ViewHost> Board<H> {
	/// Creates the board and shows the loading placeholder.
	pub fn new(mut host: H, config: &BoardConfig) -> Self {
		let view = ViewState::default();
		host.show_status(&view.load);
		Self {
			reconciler: Reconciler::new(host, config.timings()),
			feed: ChangeFeed::new(config.placement),
			view,
			subscription: None,
		}
	}

	#[must_use]
	pub fn view_state(&self) -> &ViewState {
		&self.view
	}

	#[must_use]
	pub fn reconciler(&self) -> &Reconciler<H> {
		&self.reconciler
	}

	pub fn reconciler_mut(&mut self) -> &mut Reconciler<H> {
		&mut self.reconciler
	}

	#[must_use]
	pub fn feed(&self) -> &ChangeFeed {
		&self.feed
	}

	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.subscription.as_ref().map_or(false, Subscription::is_active)
	}

	/// Applies one delivery from the change feed.
	///
	/// # Errors
	///
	/// [`Error::FeedUnavailable`] if the subscription failed. The placeholder then shows the failure for the rest of the session.
	#[instrument(skip(self, delivery))]
	pub fn on_delivery(&mut self, delivery: Delivery) -> Result<()> {
		let batch = match self.feed.accept(delivery) {
			Ok(batch) => batch,
			Err(error) => {
				if let Error::FeedUnavailable { detail } = &error {
					self.view.load = LoadState::Unavailable { detail: detail.clone() };
					self.reconciler.host_mut().show_status(&self.view.load);
				}
				return Err(error);
			}
		};

		if batch.initial_load {
			info!("Initial load complete.");
			self.view.load = LoadState::Ready;
			self.reconciler.host_mut().show_status(&self.view.load);
		}

		let count = batch.events.len();
		let rejected = self.reconciler.apply_all(batch.events);
		trace!("Applied {} of {} event(s).", count - rejected, count);

		if !search::normalize(&self.view.search_term).is_empty() {
			self.refilter();
		}
		Ok(())
	}

	/// Filters the grid by `term`, the raw search box contents. Only visibility changes.
	#[instrument(skip(self, term))]
	pub fn search(&mut self, term: &str) {
		#[cfg(feature = "dangerous-logging")]
		trace!(term);
		self.view.search_term = term.to_owned();
		self.refilter();
	}

	pub fn handle(&mut self, signal: HostSignal) {
		self.reconciler.handle(signal)
	}

	pub fn set_theme(&mut self, theme: Theme) {
		self.view.theme = theme;
	}

	/// Releases the subscription, cancels pending timers and releases all cards.
	pub fn teardown(&mut self) {
		if let Some(subscription) = self.subscription.take() {
			subscription.unsubscribe();
		}
		self.reconciler.teardown();
	}

	fn refilter(&mut self) {
		let visibility = search::visibility(&self.view.search_term, self.reconciler.items());
		self.reconciler.set_visibility(visibility);
	}
}
impl<H: 'static + ViewHost> Board<H> {
	/// Subscribes `board` to `source`. Deliveries are applied as they arrive until [`Board::teardown`].
	pub fn connect(board: &Rc<RefCell<Self>>, source: &impl ChangeSource, query: &CollectionQuery) {
		let weak = Rc::downgrade(board);
		let subscription = source.subscribe(
			query,
			Box::new(move |delivery| {
				let board = match weak.upgrade() {
					Some(board) => board,
					None => return trace!("Board is gone. Dropping delivery."),
				};
				let mut board = match board.try_borrow_mut() {
					Ok(board) => board,
					Err(_) => return error!("Board is busy. A re-entrant delivery was dropped."),
				};
				// Failures are logged and reflected in the placeholder already.
				let _ = board.on_delivery(delivery);
			}),
		);
		board.borrow_mut().subscription = Some(subscription);
	}
}
