//! A [`ViewHost`] without a rendering environment.
//!
//! Records the container's children and runs timers on a manual clock. There are no visual effects, so exiting cards
//! only leave through the fallback timer unless [`Reconciler::effect_finished`] is called explicitly.

use crate::{
	model::{LinkId, LinkItem},
	reconcile::{Phase, Reconciler, TimerId, ViewHost},
	view_state::LoadState,
};
use core::time::Duration;
use hashbrown::HashMap;
use std::collections::BTreeMap;
use tracing::error;

/// Handle to a card of a [`HeadlessHost`].
#[derive(Debug, PartialEq, Eq)]
pub struct HeadlessCard {
	key: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlessNode {
	/// The fixed "add link" card.
	Sentinel,
	Card(CardNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardNode {
	pub key: u64,
	pub id: LinkId,
	pub title: String,
	pub url: String,
	pub phase: Phase,
	/// Every phase the card was put in, starting with [`Phase::Entering`].
	pub phase_history: Vec<Phase>,
	pub visible: bool,
}

#[derive(Debug)]
pub struct HeadlessHost {
	children: Vec<HeadlessNode>,
	detached: HashMap<u64, CardNode>,
	next_key: u64,
	now: Duration,
	/// Due time by timer. Timers due at the same time fire in scheduling order.
	timers: BTreeMap<TimerId, Duration>,
	status: LoadState,
	released: Vec<LinkId>,
}
impl Default for HeadlessHost {
	fn default() -> Self {
		Self::new()
	}
}
impl HeadlessHost {
	#[must_use]
	pub fn new() -> Self {
		Self {
			children: vec![HeadlessNode::Sentinel],
			detached: HashMap::new(),
			next_key: 0,
			now: Duration::ZERO,
			timers: BTreeMap::new(),
			status: LoadState::Loading,
			released: Vec::new(),
		}
	}

	/// The container's children, sentinel first.
	#[must_use]
	pub fn children(&self) -> &[HeadlessNode] {
		&self.children
	}

	/// Ids of the cards in the container, in order, sentinel excluded.
	#[must_use]
	pub fn card_ids(&self) -> Vec<LinkId> {
		self.cards().map(|card| card.id.clone()).collect()
	}

	pub fn cards(&self) -> impl Iterator<Item = &CardNode> {
		self.children.iter().filter_map(|child| match child {
			HeadlessNode::Sentinel => None,
			HeadlessNode::Card(card) => Some(card),
		})
	}

	#[must_use]
	pub fn card(&self, id: &LinkId) -> Option<&CardNode> {
		self.cards().find(|card| &card.id == id)
	}

	/// Cards that were created but never inserted.
	#[must_use]
	pub fn detached_count(&self) -> usize {
		self.detached.len()
	}

	/// Ids of released cards, in release order.
	#[must_use]
	pub fn released(&self) -> &[LinkId] {
		&self.released
	}

	#[must_use]
	pub fn status(&self) -> &LoadState {
		&self.status
	}

	#[must_use]
	pub fn now(&self) -> Duration {
		self.now
	}

	#[must_use]
	pub fn pending_timers(&self) -> usize {
		self.timers.len()
	}

	/// Removes and returns the earliest timer due at or before `until`, advancing the clock to its due time.
	pub fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
		let (timer, due) = self
			.timers
			.iter()
			.map(|(timer, due)| (*timer, *due))
			.filter(|(_, due)| *due <= until)
			.min_by_key(|(timer, due)| (*due, *timer))?;
		self.timers.remove(&timer);
		self.now = self.now.max(due);
		Some(timer)
	}

	fn card_mut(&mut self, key: u64) -> Option<&mut CardNode> {
		self.children.iter_mut().find_map(|child| match child {
			HeadlessNode::Card(card) if card.key == key => Some(card),
			_ => None,
		})
	}

	fn index_of(&self, key: u64) -> Option<usize> {
		self.children.iter().position(|child| matches!(child, HeadlessNode::Card(card) if card.key == key))
	}
}
impl ViewHost for HeadlessHost {
	type Card = HeadlessCard;

	fn create_card(&mut self, item: &LinkItem) -> HeadlessCard {
		let key = self.next_key;
		self.next_key += 1;
		self.detached.insert(
			key,
			CardNode {
				key,
				id: item.id.clone(),
				title: item.title.clone(),
				url: item.url.clone(),
				phase: Phase::Entering,
				phase_history: vec![Phase::Entering],
				visible: true,
			},
		);
		HeadlessCard { key }
	}

	fn insert_card(&mut self, card: &HeadlessCard, before: Option<&HeadlessCard>) {
		let node = match self.detached.remove(&card.key) {
			Some(node) => node,
			None => return error!("Card {} is not detached.", card.key),
		};
		let index = match before {
			Some(before) => match self.index_of(before.key) {
				Some(index) => index,
				None => {
					error!("Reference card {} is not in the container. Appending.", before.key);
					self.children.len()
				}
			},
			None => self.children.len(),
		};
		self.children.insert(index, HeadlessNode::Card(node));
	}

	fn set_phase(&mut self, card: &HeadlessCard, phase: Phase) {
		match self.card_mut(card.key) {
			Some(node) => {
				node.phase = phase;
				node.phase_history.push(phase);
			}
			None => error!("Card {} is not in the container.", card.key),
		}
	}

	fn set_visible(&mut self, card: &HeadlessCard, visible: bool) {
		match self.card_mut(card.key) {
			Some(node) => node.visible = visible,
			None => error!("Card {} is not in the container.", card.key),
		}
	}

	fn release_card(&mut self, card: HeadlessCard) {
		match self.index_of(card.key) {
			Some(index) => {
				if let HeadlessNode::Card(node) = self.children.remove(index) {
					self.released.push(node.id);
				}
			}
			None => match self.detached.remove(&card.key) {
				Some(node) => self.released.push(node.id),
				None => error!("Card {} was already released.", card.key),
			},
		}
	}

	fn schedule(&mut self, timer: TimerId, delay: Duration) {
		self.timers.insert(timer, self.now + delay);
	}

	fn clear_timer(&mut self, timer: TimerId) {
		self.timers.remove(&timer);
	}

	fn show_status(&mut self, status: &LoadState) {
		self.status = status.clone();
	}
}

impl Reconciler<HeadlessHost> {
	/// Advances the host's clock by `by`, firing every timer that comes due on the way, including ones scheduled meanwhile.
	pub fn advance(&mut self, by: Duration) {
		let until = self.host().now() + by;
		while let Some(timer) = self.host_mut().pop_due(until) {
			self.fire(timer)
		}
		self.host_mut().now = until;
	}
}
