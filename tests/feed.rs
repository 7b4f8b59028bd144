use linkboard::{
	feed::{ChangeFeed, ChangeSource, CollectionQuery, FeedState, Placement},
	memory::MemoryCollection,
	model::{NewLink, RawChange},
	BackendError, ChangeEvent, Error, LinkId, LinkItem,
};
use std::{cell::RefCell, rc::Rc};

fn link(title: &str) -> NewLink {
	NewLink {
		title: title.to_owned(),
		url: format!("https://{}.example", title.to_lowercase()),
	}
}

#[test]
fn first_delivery_is_the_initial_load() {
	let mut feed = ChangeFeed::new(Placement::Indexed);
	assert_eq!(feed.state(), FeedState::Connecting);

	let batch = feed.accept(Ok(Vec::new())).unwrap();
	assert!(batch.initial_load);
	assert!(batch.events.is_empty());
	assert_eq!(feed.state(), FeedState::Live);

	let batch = feed.accept(Ok(vec![RawChange::added(LinkItem::new("1", "Go", "https://go.dev"), 0)])).unwrap();
	assert!(!batch.initial_load);
	assert_eq!(batch.events.len(), 1);
}

#[test]
fn changes_translate_in_delivery_order() {
	let go = LinkItem::new("1", "Go", "https://go.dev");
	let rust = LinkItem::new("2", "Rust", "https://rust-lang.org");

	let mut feed = ChangeFeed::new(Placement::Indexed);
	let batch = feed
		.accept(Ok(vec![
			RawChange::added(go.clone(), 0),
			RawChange::modified(go.clone(), 0),
			RawChange::added(rust.clone(), 0),
			RawChange::removed(go),
		]))
		.unwrap();

	assert_eq!(
		batch.events,
		[
			ChangeEvent::Added {
				item: LinkItem::new("1", "Go", "https://go.dev"),
				position_hint: Some(0)
			},
			ChangeEvent::Added { item: rust, position_hint: Some(0) },
			ChangeEvent::Removed { id: "1".into() },
		]
	);
}

#[test]
fn append_placement_drops_position_hints() {
	let mut feed = ChangeFeed::new(Placement::Append);
	let batch = feed.accept(Ok(vec![RawChange::added(LinkItem::new("1", "Go", "https://go.dev"), 3)])).unwrap();
	assert!(matches!(&batch.events[..], [ChangeEvent::Added { position_hint: None, .. }]));
}

#[test]
fn failure_is_terminal() {
	let mut feed = ChangeFeed::new(Placement::Indexed);
	let failure = BackendError::with_code("failed-precondition", "The query requires an index.");

	match feed.accept(Err(failure)) {
		Err(Error::FeedUnavailable { detail }) => assert_eq!(detail, "[failed-precondition] The query requires an index."),
		other => panic!("Expected FeedUnavailable, got {:?}", other),
	}
	assert_eq!(feed.state(), FeedState::Unavailable);

	let batch = feed.accept(Ok(vec![RawChange::added(LinkItem::new("1", "Go", "https://go.dev"), 0)])).unwrap();
	assert!(batch.events.is_empty());
	assert!(!batch.initial_load);
	assert_eq!(feed.state(), FeedState::Unavailable);
}

fn recording_subscription(store: &MemoryCollection) -> (Rc<RefCell<Vec<Result<Vec<RawChange>, BackendError>>>>, linkboard::feed::Subscription) {
	let deliveries = Rc::new(RefCell::new(Vec::new()));
	let subscription = {
		let deliveries = deliveries.clone();
		store.subscribe(&CollectionQuery::default(), Box::new(move |delivery| deliveries.borrow_mut().push(delivery)))
	};
	(deliveries, subscription)
}

#[test]
fn memory_collection_starts_with_a_snapshot() {
	let store = MemoryCollection::new();
	let first = store.insert(link("Go")).unwrap();
	let second = store.insert(link("Rust")).unwrap();

	let (deliveries, _subscription) = recording_subscription(&store);
	assert!(deliveries.borrow().is_empty());
	assert_eq!(store.flush(), 1);

	let deliveries = deliveries.borrow();
	let snapshot = deliveries[0].as_ref().unwrap();
	let ids: Vec<(&LinkId, Option<usize>)> = snapshot.iter().map(|change| (&change.item.id, change.new_index)).collect();
	assert_eq!(ids, [(&second, Some(0)), (&first, Some(1))]);
}

#[test]
fn empty_collection_still_delivers_a_snapshot() {
	let store = MemoryCollection::new();
	let (deliveries, _subscription) = recording_subscription(&store);
	assert_eq!(store.flush(), 1);
	assert!(matches!(&deliveries.borrow()[..], [Ok(changes)] if changes.is_empty()));

	// Nothing new, nothing delivered.
	assert_eq!(store.flush(), 0);
}

#[test]
fn newest_link_is_added_at_the_front() {
	let store = MemoryCollection::new();
	store.insert(link("Go")).unwrap();
	let (deliveries, _subscription) = recording_subscription(&store);
	store.flush();

	let rust = store.insert(link("Rust")).unwrap();
	store.flush();
	let deliveries = deliveries.borrow();
	let change = &deliveries[1].as_ref().unwrap()[0];
	assert_eq!(change.item.id, rust);
	assert_eq!(change.new_index, Some(0));
	assert!(change.item.created_at.is_some());
}

#[test]
fn unsubscribing_stops_deliveries() {
	let store = MemoryCollection::new();
	let (deliveries, subscription) = recording_subscription(&store);
	assert_eq!(store.subscriber_count(), 1);

	subscription.unsubscribe();
	assert_eq!(store.subscriber_count(), 0);
	store.insert(link("Go")).unwrap();
	assert_eq!(store.flush(), 0);
	assert!(deliveries.borrow().is_empty());
}

#[test]
fn failed_subscription_delivers_its_error_once() {
	let store = MemoryCollection::new();
	store.fail_next_subscription(BackendError::with_code("failed-precondition", "The query requires an index."));
	let (deliveries, _subscription) = recording_subscription(&store);

	assert_eq!(store.flush(), 1);
	assert!(deliveries.borrow()[0].is_err());
	assert_eq!(store.subscriber_count(), 0);

	store.insert(link("Go")).unwrap();
	assert_eq!(store.flush(), 0);
}
