//! Incremental reconciliation of [`ChangeEvent`]s onto an ordered list of view nodes.
//!
//! The list is mirrored 1:1 onto cards owned by a [`ViewHost`]. The host's container always starts with a sentinel node
//! (the "add link" card), which the reconciler never touches: data index `n` is visual index `n + 1`.
//!
//! Each card goes through `Entering → Steady → Exiting → Removed`:
//!
//! - `Entering → Steady` on a timer, so that the pre-transition state gets painted first.
//! - `Steady → Exiting` only through [`Reconciler::apply_removed`].
//! - `Exiting → Removed` on [`Reconciler::effect_finished`] or a fallback timer, whichever comes first.
//!
//! Exiting cards stay in the container until they are removed, but they are no longer part of the data ordering.

use crate::{
	config::Timings,
	error::{Error, Result},
	model::{ChangeEvent, LinkId, LinkItem},
	view_state::LoadState,
};
use core::time::Duration;
use hashbrown::HashMap;
use tracing::{debug, error, instrument, trace, trace_span, warn};

/// Visual state of a rendered card. `Removed` has no variant: removed cards are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
	/// Inserted in its pre-transition state.
	Entering,
	Steady,
	/// Animating out. Still rendered, no longer part of the ordering.
	Exiting,
}

/// Identifies a timer scheduled through [`ViewHost::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Asynchronous notifications a host forwards back into the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
	TimerFired(TimerId),
	/// The card's visual effect (e.g. a CSS transition) finished.
	EffectFinished(LinkId),
}

/// The rendering environment.
///
/// Hosts must not call back into the [`Reconciler`] synchronously from any of these methods.
/// Timers and effect completions are reported later, as [`HostSignal`]s.
pub trait ViewHost {
	/// A rendered card, including whatever listeners the host attached to it.
	type Card;

	/// Creates a detached card in its [`Phase::Entering`] state.
	fn create_card(&mut self, item: &LinkItem) -> Self::Card;

	/// Inserts `card` before `before`, or at the end of the container.
	fn insert_card(&mut self, card: &Self::Card, before: Option<&Self::Card>);

	fn set_phase(&mut self, card: &Self::Card, phase: Phase);

	fn set_visible(&mut self, card: &Self::Card, visible: bool);

	/// Detaches `card` and frees its resources.
	fn release_card(&mut self, card: Self::Card);

	/// Reports [`HostSignal::TimerFired`] after `delay`, unless cleared first.
	fn schedule(&mut self, timer: TimerId, delay: Duration);

	/// Cancels `timer` if pending. Also called for timers that already fired, so that the host can forget them.
	fn clear_timer(&mut self, timer: TimerId);

	/// Updates the loading/error placeholder.
	fn show_status(&mut self, status: &LoadState);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
	Enter,
	ExitFallback,
}

#[derive(Debug)]
struct Entry<C> {
	item: LinkItem,
	card: C,
	phase: Phase,
	/// At most one timer is pending per entry: the enter flip or the exit fallback.
	timer: Option<TimerId>,
	visible: bool,
}

pub struct Reconciler<H: ViewHost> {
	host: H,
	/// In visual order, sentinel excluded.
	entries: Vec<Entry<H::Card>>,
	timers: HashMap<TimerId, (LinkId, TimerKind)>,
	next_timer: u64,
	timings: Timings,
}
impl<H: ViewHost> Reconciler<H> {
	#[must_use]
	pub fn new(host: H, timings: Timings) -> Self {
		Self {
			host,
			entries: Vec::new(),
			timers: HashMap::new(),
			next_timer: 0,
			timings,
		}
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	#[must_use]
	pub fn timings(&self) -> Timings {
		self.timings
	}

	/// Number of rendered cards, exiting ones included.
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Rendered items in visual order, exiting ones included.
	pub fn items(&self) -> impl Iterator<Item = &LinkItem> {
		self.entries.iter().map(|entry| &entry.item)
	}

	/// Ids of all rendered cards in visual order, exiting ones included.
	#[must_use]
	pub fn rendered_ids(&self) -> Vec<&LinkId> {
		self.entries.iter().map(|entry| &entry.item.id).collect()
	}

	/// Ids in data order: rendered cards that are not exiting.
	#[must_use]
	pub fn live_ids(&self) -> Vec<&LinkId> {
		self.entries.iter().filter(|entry| entry.phase != Phase::Exiting).map(|entry| &entry.item.id).collect()
	}

	#[must_use]
	pub fn phase(&self, id: &LinkId) -> Option<Phase> {
		self.position(id).map(|index| self.entries[index].phase)
	}

	#[must_use]
	pub fn is_visible(&self, id: &LinkId) -> Option<bool> {
		self.position(id).map(|index| self.entries[index].visible)
	}

	/// Number of timers the reconciler is still waiting for.
	#[must_use]
	pub fn pending_timers(&self) -> usize {
		self.timers.len()
	}

	pub fn apply(&mut self, event: ChangeEvent) -> Result<()> {
		match event {
			ChangeEvent::Added { item, position_hint } => self.apply_added(item, position_hint),
			ChangeEvent::Removed { id } => {
				self.apply_removed(&id);
				Ok(())
			}
		}
	}

	/// Applies `events` in order. Each event is applied atomically; a rejected one is logged and skipped.
	///
	/// Returns the number of rejected events.
	#[instrument(skip(self, events))]
	pub fn apply_all(&mut self, events: impl IntoIterator<Item = ChangeEvent>) -> usize {
		let mut rejected = 0;
		for event in events {
			if let Err(error) = self.apply(event) {
				error!("Change event rejected: {}", error);
				rejected += 1;
			}
		}
		rejected
	}

	/// Inserts `item` at `position_hint` (in data order), or appends it if there's no hint.
	///
	/// Hints beyond the end of the list are clamped to appending.
	///
	/// # Errors
	///
	/// [`Error::DuplicateLink`] if `item.id` is already rendered and not exiting. Nothing changes in that case.
	/// If it is exiting, that card is removed right away and the new one is inserted.
	pub fn apply_added(&mut self, item: LinkItem, position_hint: Option<usize>) -> Result<()> {
		let span = trace_span!("Adding link", id = %item.id, ?position_hint);
		let _enter = span.enter();

		#[cfg(feature = "dangerous-logging")]
		trace!(title = %item.title, url = %item.url);

		if let Some(index) = self.position(&item.id) {
			if self.entries[index].phase == Phase::Exiting {
				debug!("Link {} is added again while exiting. Finishing the exit early.", item.id);
				self.finish_exit(index);
			} else {
				return Err(Error::DuplicateLink(item.id));
			}
		}

		let live = self.live_len();
		let data_index = match position_hint {
			Some(hint) if hint <= live => hint,
			Some(hint) => {
				warn!("Position hint {} is beyond the {} link(s) in the list. Appending.", hint, live);
				live
			}
			None => live,
		};
		let slot = self.slot_of(data_index);

		let card = self.host.create_card(&item);
		self.host.insert_card(&card, self.entries.get(slot).map(|entry| &entry.card));

		let timer = self.schedule(item.id.clone(), TimerKind::Enter, self.timings.enter_delay);
		trace!("Inserted at visual index {}.", slot + 1);
		self.entries.insert(
			slot,
			Entry {
				item,
				card,
				phase: Phase::Entering,
				timer: Some(timer),
				visible: true,
			},
		);
		Ok(())
	}

	/// Starts the exit of `id`. A no-op if it isn't rendered or is already exiting.
	///
	/// Returns whether an exit was started.
	pub fn apply_removed(&mut self, id: &LinkId) -> bool {
		let span = trace_span!("Removing link", %id);
		let _enter = span.enter();

		let index = match self.position(id) {
			Some(index) => index,
			None => {
				trace!("Not rendered. Nothing to remove.");
				return false;
			}
		};

		match self.entries[index].phase {
			Phase::Exiting => {
				trace!("Already exiting.");
				return false;
			}
			Phase::Entering => {
				trace!("Removed while entering. Settling first.");
				self.clear_entry_timer(index);
				self.transition(index, Phase::Steady);
			}
			Phase::Steady => (),
		}

		self.transition(index, Phase::Exiting);
		let timer = self.schedule(id.clone(), TimerKind::ExitFallback, self.timings.exit_fallback);
		self.entries[index].timer = Some(timer);
		true
	}

	/// The exit effect of `id` finished. Ignored unless `id` is exiting.
	pub fn effect_finished(&mut self, id: &LinkId) {
		match self.position(id) {
			Some(index) if self.entries[index].phase == Phase::Exiting => self.finish_exit(index),
			Some(index) => trace!("Ignoring effect end of {} while {:?}.", id, self.entries[index].phase),
			None => trace!("Ignoring effect end of {}, which is no longer rendered.", id),
		}
	}

	pub fn fire(&mut self, timer: TimerId) {
		let (id, kind) = match self.timers.remove(&timer) {
			Some(scheduled) => scheduled,
			None => return trace!("{:?} was already cleared.", timer),
		};
		self.host.clear_timer(timer);

		let index = match self.position(&id) {
			Some(index) if self.entries[index].timer == Some(timer) => index,
			_ => return error!("{:?} fired for {}, which doesn't own it.", timer, id),
		};
		self.entries[index].timer = None;

		match (kind, self.entries[index].phase) {
			(TimerKind::Enter, Phase::Entering) => self.transition(index, Phase::Steady),
			(TimerKind::ExitFallback, Phase::Exiting) => {
				debug!("Exit effect of {} didn't finish within {:?}. Removing anyway.", id, self.timings.exit_fallback);
				self.finish_exit(index)
			}
			(kind, phase) => error!("{:?} timer fired for {} while {:?}. Ignoring.", kind, id, phase),
		}
	}

	pub fn handle(&mut self, signal: HostSignal) {
		match signal {
			HostSignal::TimerFired(timer) => self.fire(timer),
			HostSignal::EffectFinished(id) => self.effect_finished(&id),
		}
	}

	/// Applies visibility flags, e.g. from [`search::visibility`](`crate::search::visibility`). Ids that aren't rendered are ignored.
	///
	/// Never changes membership or order.
	pub fn set_visibility(&mut self, visibility: impl IntoIterator<Item = (LinkId, bool)>) {
		for (id, visible) in visibility {
			let index = match self.position(&id) {
				Some(index) => index,
				None => continue,
			};
			let entry = &mut self.entries[index];
			if entry.visible != visible {
				entry.visible = visible;
				self.host.set_visible(&entry.card, visible)
			}
		}
	}

	/// Cancels all pending timers and releases every card.
	#[instrument(skip(self))]
	pub fn teardown(&mut self) {
		for (timer, _) in self.timers.drain() {
			self.host.clear_timer(timer)
		}
		for entry in self.entries.drain(..) {
			self.host.release_card(entry.card)
		}
	}

	fn position(&self, id: &LinkId) -> Option<usize> {
		self.entries.iter().position(|entry| &entry.item.id == id)
	}

	fn live_len(&self) -> usize {
		self.entries.iter().filter(|entry| entry.phase != Phase::Exiting).count()
	}

	/// Index into `entries` that data index `data_index` is inserted at.
	fn slot_of(&self, data_index: usize) -> usize {
		self.entries
			.iter()
			.enumerate()
			.filter(|(_, entry)| entry.phase != Phase::Exiting)
			.nth(data_index)
			.map_or(self.entries.len(), |(slot, _)| slot)
	}

	fn transition(&mut self, index: usize, phase: Phase) {
		let entry = &mut self.entries[index];
		debug_assert!(
			matches!((entry.phase, phase), (Phase::Entering, Phase::Steady) | (Phase::Steady, Phase::Exiting)),
			"Invalid card transition {:?} -> {:?}",
			entry.phase,
			phase
		);
		trace!("{}: {:?} -> {:?}", entry.item.id, entry.phase, phase);
		entry.phase = phase;
		self.host.set_phase(&entry.card, phase)
	}

	fn schedule(&mut self, id: LinkId, kind: TimerKind, delay: Duration) -> TimerId {
		let timer = TimerId(self.next_timer);
		self.next_timer += 1;
		self.timers.insert(timer, (id, kind));
		self.host.schedule(timer, delay);
		timer
	}

	fn clear_entry_timer(&mut self, index: usize) {
		if let Some(timer) = self.entries[index].timer.take() {
			self.timers.remove(&timer);
			self.host.clear_timer(timer)
		}
	}

	fn finish_exit(&mut self, index: usize) {
		self.clear_entry_timer(index);
		let entry = self.entries.remove(index);
		debug!("Link {} removed.", entry.item.id);
		self.host.release_card(entry.card)
	}
}
