//! Wires a [`Board`] to the hosted page.

use super::{
	firestore::FirestoreCollection,
	host::{link_id_of, spotlight, DomHost, SignalDispatcher},
	listeners::Listeners,
	storage::{BrowserConfirm, LocalStorage},
};
use crate::{
	board::Board,
	config::BoardConfig,
	form::EntryForm,
	gateway::SubmissionGateway,
	theme::{Theme, ThemeSwitch},
};
use std::{cell::RefCell, rc::Rc, sync::Once};
use tracing::{error, info, trace};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent};

type Gateway = SubmissionGateway<FirestoreCollection>;

/// A board mounted onto the page by [`mount`].
#[wasm_bindgen]
pub struct MountedBoard {
	board: Rc<RefCell<Board<DomHost>>>,
	_listeners: Vec<Listeners>,
}
#[wasm_bindgen]
impl MountedBoard {
	/// Unsubscribes, cancels pending animations and removes every card and page listener.
	pub fn unmount(self) {
		self.board.borrow_mut().teardown();
		info!("Unmounted.");
	}

	/// Number of rendered cards, exiting ones included.
	#[wasm_bindgen(js_name = cardCount)]
	#[must_use]
	pub fn card_count(&self) -> usize {
		self.board.borrow().reconciler().len()
	}
}

/// The entry form's elements.
#[derive(Clone)]
struct FormView {
	overlay: Element,
	title: HtmlInputElement,
	url: HtmlInputElement,
}
impl FormView {
	/// Shows or hides the modal and writes the form's values back into the inputs.
	fn sync(&self, form: &EntryForm) {
		if let Err(error) = self.overlay.class_list().toggle_with_force("hidden", !form.is_open()) {
			error!("Failed to toggle the entry form: {:?}", error)
		}
		self.title.set_value(form.title());
		self.url.set_value(form.url());
		if form.is_open() {
			if let Err(error) = self.title.focus() {
				error!("Failed to focus the title input: {:?}", error)
			}
		}
	}

	fn read_into(&self, form: &mut EntryForm) {
		form.set_title(self.title.value());
		form.set_url(self.url.value());
	}
}

fn install_logging() {
	static INSTALL: Once = Once::new();
	INSTALL.call_once(|| {
		console_error_panic_hook::set_once();
		tracing_wasm::set_as_global_default();
	});
}

fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
	document.get_element_by_id(id).ok_or_else(|| JsValue::from_str(&format!("Missing element #{}.", id)))
}

fn input(document: &Document, id: &str) -> Result<HtmlInputElement, JsValue> {
	element(document, id)?.dyn_into().map_err(|_| JsValue::from_str(&format!("#{} is not an input.", id)))
}

fn apply_theme(document: &Document, theme: Theme) {
	if let Some(body) = document.body() {
		if let Err(error) = body.class_list().toggle_with_force("light-mode", theme == Theme::Light) {
			error!("Failed to apply theme: {:?}", error)
		}
	}
}

/// Mounts the link board onto the current page.
///
/// `config` is a (possibly partial) [`BoardConfig`] object, or `undefined` for the defaults.
///
/// # Errors
///
/// If `config` is malformed or the page lacks one of the expected elements.
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<MountedBoard, JsValue> {
	install_logging();

	let config: BoardConfig = if config.is_undefined() || config.is_null() { BoardConfig::default() } else { serde_wasm_bindgen::from_value(config)? };
	let document = web_sys::window().and_then(|window| window.document()).ok_or_else(|| JsValue::from_str("No document."))?;

	let grid = element(&document, "link-grid")?;
	let sentinel: HtmlElement = element(&document, "add-link-card")?.dyn_into()?;
	let search_box = input(&document, "search-box")?;
	let form_element = element(&document, "new-link-form")?;
	let cancel = element(&document, "cancel-add-btn")?;
	let theme_toggle = element(&document, "theme-toggle")?;
	let view = FormView {
		overlay: element(&document, "modal-overlay")?,
		title: input(&document, "link-title")?,
		url: input(&document, "link-url")?,
	};

	let signals = SignalDispatcher::default();
	let board = Rc::new(RefCell::new(Board::new(DomHost::new(document.clone(), grid.clone(), &config, signals.clone()), &config)));
	{
		let board = Rc::downgrade(&board);
		signals.bind(move |signal| {
			let board = match board.upgrade() {
				Some(board) => board,
				None => return trace!("Board is gone. Dropping {:?}.", signal),
			};
			match board.try_borrow_mut() {
				Ok(mut board) => board.handle(signal),
				Err(_) => error!("Board is busy. {:?} was dropped.", signal),
			};
		});
	}

	let store = Rc::new(FirestoreCollection::new(config.collection.clone(), config.order_field.clone()));
	Board::connect(&board, &*store, &config.query());

	let form = Rc::new(RefCell::new(EntryForm::new()));
	let gateway: Rc<Gateway> = Rc::new(SubmissionGateway::new(store, form.clone(), config.delete_prompt.clone()));
	view.sync(&form.borrow());

	let theme = Rc::new(RefCell::new(ThemeSwitch::load(LocalStorage::new(), config.theme_key.clone())));
	apply_theme(&document, theme.borrow().current());
	board.borrow_mut().set_theme(theme.borrow().current());

	let mut listeners = Vec::new();

	let mut sentinel_listeners = Listeners::new(&sentinel);
	spotlight(&mut sentinel_listeners, &sentinel);
	{
		let (form, view) = (form.clone(), view.clone());
		sentinel_listeners.listen("click", move |_| {
			form.borrow_mut().open();
			view.sync(&form.borrow());
		});
	}
	listeners.push(sentinel_listeners);

	let mut cancel_listeners = Listeners::new(&cancel);
	{
		let (form, view) = (form.clone(), view.clone());
		cancel_listeners.listen("click", move |_| {
			form.borrow_mut().close();
			view.sync(&form.borrow());
		});
	}
	listeners.push(cancel_listeners);

	let mut overlay_listeners = Listeners::new(&view.overlay);
	{
		let (form, view) = (form.clone(), view.clone());
		let backdrop: EventTarget = view.overlay.clone().into();
		overlay_listeners.listen("click", move |event| {
			// Only clicks on the backdrop itself, not on the dialog.
			if event.target().as_ref() == Some(&backdrop) {
				form.borrow_mut().close();
				view.sync(&form.borrow());
			}
		});
	}
	listeners.push(overlay_listeners);

	let mut document_listeners = Listeners::new(&document);
	{
		let (form, view) = (form.clone(), view.clone());
		document_listeners.listen("keydown", move |event| {
			let key = match event.dyn_ref::<KeyboardEvent>() {
				Some(event) => event.key(),
				None => return,
			};
			if form.borrow_mut().handle_key(&key) {
				view.sync(&form.borrow());
			}
		});
	}
	listeners.push(document_listeners);

	let mut form_listeners = Listeners::new(&form_element);
	{
		let (gateway, view) = (gateway.clone(), view.clone());
		form_listeners.listen("submit", move |event| {
			event.prevent_default();
			view.read_into(&mut gateway.form().borrow_mut());
			let (gateway, view) = (gateway.clone(), view.clone());
			spawn_local(async move {
				// Failures are logged by the gateway. The form stays open with its values.
				let _ = gateway.submit().await;
				view.sync(&gateway.form().borrow());
			});
		});
	}
	listeners.push(form_listeners);

	let mut grid_listeners = Listeners::new(&grid);
	{
		let gateway = gateway.clone();
		grid_listeners.listen("click", move |event| {
			let button = match event.target().and_then(|target| target.dyn_into::<Element>().ok()).and_then(|target| target.closest(".delete-btn").ok().flatten()) {
				Some(button) => button,
				None => return,
			};
			// Don't follow the card's link.
			event.prevent_default();
			event.stop_propagation();
			let id = match link_id_of(&button) {
				Some(id) => id,
				None => return error!("Delete button without data-id."),
			};
			let gateway = gateway.clone();
			spawn_local(async move {
				let _ = gateway.delete(&id, &BrowserConfirm).await;
			});
		});
	}
	listeners.push(grid_listeners);

	let mut search_listeners = Listeners::new(&search_box);
	{
		let (board, search_box) = (Rc::downgrade(&board), search_box.clone());
		search_listeners.listen("input", move |_| {
			if let Some(board) = board.upgrade() {
				match board.try_borrow_mut() {
					Ok(mut board) => board.search(&search_box.value()),
					Err(_) => error!("Board is busy. Search input dropped."),
				}
			}
		});
	}
	listeners.push(search_listeners);

	let mut theme_listeners = Listeners::new(&theme_toggle);
	{
		let (board, document) = (Rc::downgrade(&board), document.clone());
		theme_listeners.listen("click", move |_| {
			let theme = theme.borrow_mut().toggle();
			apply_theme(&document, theme);
			if let Some(board) = board.upgrade() {
				board.borrow_mut().set_theme(theme);
			}
		});
	}
	listeners.push(theme_listeners);

	info!(collection = %config.collection, "Mounted.");
	Ok(MountedBoard { board, _listeners: listeners })
}
