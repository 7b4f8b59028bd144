#![cfg(all(not(target_arch = "wasm32"), not(feature = "dangerous-logging")))]

use core::time::Duration;
use linkboard::{
	favicon::{self, Favicon},
	headless::HeadlessHost,
	memory::MemoryCollection,
	model::NewLink,
	Board, BoardConfig,
};
use std::{
	cell::RefCell,
	io,
	rc::Rc,
	sync::{Arc, Mutex},
};
use tracing::Level;

const SECRET_TITLE: &str = "Alice's medical records";
const SECRET_URL: &str = "secret-personal-path/alice@private";

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);
impl Captured {
	fn text(&self) -> String {
		String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
	}
}
impl io::Write for Captured {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

fn logged(f: impl FnOnce()) -> String {
	let captured = Captured::default();
	let writer = captured.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(Level::TRACE)
		.with_ansi(false)
		.with_writer(move || writer.clone())
		.finish();
	tracing::subscriber::with_default(subscriber, f);
	captured.text()
}

#[test]
fn fallback_icons_do_not_log_the_url() {
	let service = BoardConfig::default().favicon_service();
	let log = logged(|| {
		assert_eq!(favicon::resolve(SECRET_URL, &service), Favicon::Fallback);
		assert_eq!(favicon::resolve("mailto:alice@private.example", &service), Favicon::Fallback);
	});

	assert!(log.contains("fallback icon"), "nothing was captured: {:?}", log);
	assert!(!log.contains(SECRET_URL), "{}", log);
	assert!(!log.contains("alice@private.example"), "{}", log);
}

#[test]
fn board_logs_only_link_ids() {
	let store = MemoryCollection::new();
	let log = logged(|| {
		let config = BoardConfig::default();
		let board = Rc::new(RefCell::new(Board::new(HeadlessHost::new(), &config)));
		Board::connect(&board, &store, &config.query());
		store.flush();

		let id = store
			.insert(NewLink {
				title: SECRET_TITLE.to_owned(),
				url: SECRET_URL.to_owned(),
			})
			.unwrap();
		store.flush();
		board.borrow_mut().search("alice");
		store.remove(&id).unwrap();
		store.flush();
		board.borrow_mut().reconciler_mut().advance(Duration::from_secs(1));
		board.borrow_mut().teardown();
	});

	assert!(log.contains("link-1"), "nothing was captured: {:?}", log);
	assert!(!log.contains(SECRET_TITLE), "{}", log);
	assert!(!log.contains(SECRET_URL), "{}", log);
	assert!(!log.contains("alice"), "{}", log);
}
