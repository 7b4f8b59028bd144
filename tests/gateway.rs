use async_trait::async_trait;
use futures::executor::block_on;
use linkboard::{
	form::EntryForm,
	gateway::{Confirm, DeleteOutcome, SubmissionGateway},
	memory::MemoryCollection,
	BackendError, Error, LinkId,
};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};

struct Answer {
	yes: bool,
	asked: Cell<usize>,
}
impl Answer {
	fn new(yes: bool) -> Self {
		Self { yes, asked: Cell::new(0) }
	}
}
#[async_trait(?Send)]
impl Confirm for Answer {
	async fn confirm(&self, prompt: &str) -> bool {
		assert_eq!(prompt, "Delete this link?");
		self.asked.set(self.asked.get() + 1);
		self.yes
	}
}

fn gateway(store: &MemoryCollection) -> SubmissionGateway<MemoryCollection> {
	SubmissionGateway::new(Rc::new(store.clone()), Rc::new(RefCell::new(EntryForm::new())), "Delete this link?")
}

fn fill(gateway: &SubmissionGateway<MemoryCollection>, title: &str, url: &str) {
	let mut form = gateway.form().borrow_mut();
	form.open();
	form.set_title(title);
	form.set_url(url);
}

#[test]
fn submit_creates_and_closes_the_form() {
	let store = MemoryCollection::new();
	let gateway = gateway(&store);
	fill(&gateway, "Go", "https://go.dev");

	let id = block_on(gateway.submit()).unwrap();
	assert_eq!(store.docs().len(), 1);
	assert_eq!(store.docs()[0].id, id);
	assert_eq!(store.docs()[0].title, "Go");
	assert!(!gateway.form().borrow().is_open());
	assert_eq!(gateway.form().borrow().title(), "");
}

#[test]
fn rejected_submission_keeps_the_form() {
	let store = MemoryCollection::new();
	store.fail_writes(Some(BackendError::with_code("permission-denied", "Missing or insufficient permissions.")));
	let gateway = gateway(&store);
	fill(&gateway, "Go", "https://go.dev");

	let result = block_on(gateway.submit());
	assert!(matches!(result, Err(Error::SubmissionFailed(BackendError { ref code, .. })) if code.as_deref() == Some("permission-denied")));
	let form = gateway.form().borrow();
	assert!(form.is_open());
	assert_eq!(form.title(), "Go");
	assert_eq!(form.url(), "https://go.dev");
	assert!(store.docs().is_empty());
}

#[test]
fn blank_submission_is_not_sent() {
	let store = MemoryCollection::new();
	let gateway = gateway(&store);
	fill(&gateway, "Go", " ");

	assert!(matches!(block_on(gateway.submit()), Err(Error::InvalidSubmission(_))));
	assert!(store.docs().is_empty());
	assert!(gateway.form().borrow().is_open());
}

#[test]
fn delete_asks_first() {
	let store = MemoryCollection::new();
	let id = store.insert(linkboard::model::NewLink {
		title: "Go".to_owned(),
		url: "https://go.dev".to_owned(),
	})
	.unwrap();
	let gateway = gateway(&store);

	let no = Answer::new(false);
	assert_eq!(block_on(gateway.delete(&id, &no)), Ok(DeleteOutcome::Cancelled));
	assert_eq!(no.asked.get(), 1);
	assert_eq!(store.docs().len(), 1);

	let yes = Answer::new(true);
	assert_eq!(block_on(gateway.delete(&id, &yes)), Ok(DeleteOutcome::Requested));
	assert!(store.docs().is_empty());
}

#[test]
fn rejected_delete_is_reported() {
	let store = MemoryCollection::new();
	store.fail_writes(Some(BackendError::new("offline")));
	let gateway = gateway(&store);
	let id = LinkId::from("link-1");

	match block_on(gateway.delete(&id, &Answer::new(true))) {
		Err(Error::DeleteFailed { id: failed, source }) => {
			assert_eq!(failed, id);
			assert_eq!(source.message, "offline");
		}
		other => panic!("Expected DeleteFailed, got {:?}", other),
	}
}

#[test]
fn created_links_only_render_through_the_feed() {
	use linkboard::{headless::HeadlessHost, Board, BoardConfig};

	let store = MemoryCollection::new();
	let config = BoardConfig::default();
	let board = Rc::new(RefCell::new(Board::new(HeadlessHost::new(), &config)));
	Board::connect(&board, &store, &config.query());
	store.flush();

	let gateway = gateway(&store);
	fill(&gateway, "Go", "https://go.dev");
	let id = block_on(gateway.submit()).unwrap();
	assert!(board.borrow().reconciler().is_empty());

	store.flush();
	assert_eq!(board.borrow().reconciler().host().card_ids(), [id]);
}
