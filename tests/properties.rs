#![cfg(not(target_arch = "wasm32"))]

use core::time::Duration;
use linkboard::{config::Timings, headless::HeadlessHost, search, LinkId, LinkItem, Reconciler};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
	Add(u8, usize),
	Remove(u8),
	Tick(u64),
	EffectFinished(u8),
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		(0..8_u8, 0..10_usize).prop_map(|(id, hint)| Op::Add(id, hint)),
		(0..8_u8).prop_map(Op::Remove),
		(0..700_u64).prop_map(Op::Tick),
		(0..8_u8).prop_map(Op::EffectFinished),
	]
}

fn item(id: impl ToString) -> LinkItem {
	let id = id.to_string();
	LinkItem::new(id.as_str(), format!("Link {}", id), format!("https://{}.example", id))
}

fn run(reconciler: &mut Reconciler<HeadlessHost>, op: &Op) {
	match *op {
		Op::Add(id, hint) => {
			let _ = reconciler.apply_added(item(id), Some(hint));
		}
		Op::Remove(id) => {
			reconciler.apply_removed(&LinkId::new(id.to_string()));
		}
		Op::Tick(millis) => reconciler.advance(Duration::from_millis(millis)),
		Op::EffectFinished(id) => reconciler.effect_finished(&LinkId::new(id.to_string())),
	}
}

proptest! {
	/// Links arriving in any order, each with the index it has among those that arrived so far, end up newest first.
	#[test]
	fn arrival_order_doesnt_matter(created in (1..40_usize).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())) {
		let mut reconciler = Reconciler::new(HeadlessHost::new(), Timings::default());
		let mut arrived = Vec::new();
		for &created_at in &created {
			let hint = arrived.iter().filter(|&&other| other > created_at).count();
			arrived.push(created_at);
			prop_assert!(reconciler.apply_added(item(created_at), Some(hint)).is_ok());
		}

		let mut expected = created.clone();
		expected.sort_unstable_by(|a, b| b.cmp(a));
		let expected: Vec<LinkId> = expected.into_iter().map(|created_at| LinkId::new(created_at.to_string())).collect();
		prop_assert_eq!(reconciler.host().card_ids(), expected);
	}

	#[test]
	fn never_renders_an_id_twice(ops in prop::collection::vec(op(), 0..60)) {
		let mut reconciler = Reconciler::new(HeadlessHost::new(), Timings::default());
		for op in &ops {
			run(&mut reconciler, op);

			let rendered = reconciler.host().card_ids();
			let mut seen = HashSet::new();
			prop_assert!(rendered.iter().all(|id| seen.insert(id.clone())), "{:?} after {:?}", rendered, op);
			prop_assert_eq!(rendered.iter().collect::<Vec<_>>(), reconciler.rendered_ids());
		}
	}

	#[test]
	fn removed_links_are_eventually_released(ops in prop::collection::vec(op(), 0..60)) {
		let mut reconciler = Reconciler::new(HeadlessHost::new(), Timings::default());
		for op in &ops {
			run(&mut reconciler, op);
		}

		let ids: Vec<LinkId> = reconciler.host().card_ids();
		for id in &ids {
			reconciler.apply_removed(id);
		}
		reconciler.advance(Duration::from_secs(1));

		prop_assert!(reconciler.host().card_ids().is_empty());
		prop_assert!(reconciler.is_empty());
		prop_assert_eq!(reconciler.host().detached_count(), 0);
		prop_assert_eq!(reconciler.pending_timers(), 0);
		prop_assert_eq!(reconciler.host().pending_timers(), 0);
		for id in &ids {
			prop_assert!(reconciler.host().released().contains(id));
		}
	}

	#[test]
	fn search_is_pure(titles in prop::collection::vec("[a-zA-Z ]{0,12}", 0..12), query in "[a-zA-Z ]{0,4}") {
		let items: Vec<LinkItem> = titles.iter().enumerate().map(|(id, title)| LinkItem::new(id.to_string(), title.as_str(), "https://example.com")).collect();
		prop_assert_eq!(search::visibility(&query, &items), search::visibility(&query, &items));
		prop_assert!(search::visibility("", &items).iter().all(|(_, visible)| *visible));
	}
}
