use super::listeners::Listeners;
use crate::{
	config::BoardConfig,
	favicon::{self, FaviconService, FALLBACK_ICON},
	model::{LinkId, LinkItem},
	reconcile::{HostSignal, Phase, TimerId, ViewHost},
	view_state::LoadState,
};
use core::time::Duration;
use gloo_timers::callback::Timeout;
use hashbrown::HashMap;
use std::{cell::RefCell, rc::Rc};
use tracing::{debug, error, level_filters::STATIC_MAX_LEVEL, trace, warn, Level};
use wasm_bindgen::{JsCast, UnwrapThrowExt};
use web_sys::{Document, Element, EventTarget, HtmlElement, HtmlImageElement, MouseEvent};

const ENTERING_CLASS: &str = "card-entering";
const EXITING_CLASS: &str = "card-exiting";

/// Routes [`HostSignal`]s from DOM callbacks to whoever owns the reconciler.
///
/// Cloned into every timer and listener, and bound once the owner exists.
#[derive(Clone, Default)]
pub struct SignalDispatcher(Rc<RefCell<Option<Rc<dyn Fn(HostSignal)>>>>);
impl SignalDispatcher {
	pub fn bind(&self, handler: impl 'static + Fn(HostSignal)) {
		*self.0.borrow_mut() = Some(Rc::new(handler));
	}

	pub fn dispatch(&self, signal: HostSignal) {
		// Cloned out so that the handler may rebind.
		let handler = self.0.borrow().clone();
		match handler {
			Some(handler) => handler(signal),
			None => warn!("{:?} dispatched before a handler was bound. Dropping it.", signal),
		}
	}
}

/// A rendered link card.
pub struct DomCard {
	element: HtmlElement,
	_card_listeners: Listeners,
	_icon_listeners: Listeners,
}
impl DomCard {
	#[must_use]
	pub fn element(&self) -> &HtmlElement {
		&self.element
	}
}

/// Renders cards into the grid container of a live document.
///
/// The container's first child is the "add link" card, which is left alone.
pub struct DomHost {
	document: Document,
	grid: Element,
	favicons: FaviconService,
	loading_message: String,
	unavailable_message: String,
	timers: HashMap<TimerId, Timeout>,
	signals: SignalDispatcher,
}
impl DomHost {
	#[must_use]
	pub fn new(document: Document, grid: Element, config: &BoardConfig, signals: SignalDispatcher) -> Self {
		Self {
			document,
			grid,
			favicons: config.favicon_service(),
			loading_message: config.loading_message.clone(),
			unavailable_message: config.unavailable_message.clone(),
			timers: HashMap::new(),
			signals,
		}
	}

	#[must_use]
	pub fn grid(&self) -> &Element {
		&self.grid
	}

	fn create_html(&self, tag: &str) -> HtmlElement {
		self.document.create_element(tag).unwrap_throw().dyn_into().unwrap_throw()
	}

	fn placeholder(&self) -> Option<Element> {
		self.grid.query_selector(".loading-message").ok().flatten()
	}
}

/// Tracks the pointer over `element` in `--mouse-x`/`--mouse-y`, for the spotlight effect.
pub(crate) fn spotlight(listeners: &mut Listeners, element: &HtmlElement) {
	let element = element.clone();
	listeners.listen("mousemove", move |event| {
		let event = match event.dyn_ref::<MouseEvent>() {
			Some(event) => event,
			None => return,
		};
		let rect = element.get_bounding_client_rect();
		let style = element.style();
		let x = f64::from(event.client_x()) - rect.left();
		let y = f64::from(event.client_y()) - rect.top();
		if let Err(error) = style.set_property("--mouse-x", &format!("{}px", x)).and_then(|()| style.set_property("--mouse-y", &format!("{}px", y))) {
			error!("Failed to update spotlight: {:?}", error)
		}
	})
}

impl ViewHost for DomHost {
	type Card = DomCard;

	fn create_card(&mut self, item: &LinkItem) -> DomCard {
		let card = self.create_html("article");
		card.set_class_name(&format!("link-card {}", ENTERING_CLASS));
		card.dataset().set("id", item.id.as_str()).unwrap_throw();

		let delete = self.create_html("button");
		delete.set_class_name("delete-btn");
		delete.dataset().set("id", item.id.as_str()).unwrap_throw();
		delete.set_attribute("aria-label", "Delete link").unwrap_throw();
		delete.set_text_content(Some("×"));

		let anchor = self.create_html("a");
		anchor.set_attribute("href", &item.url).unwrap_throw();
		anchor.set_attribute("target", "_blank").unwrap_throw();
		anchor.set_attribute("rel", "noopener noreferrer").unwrap_throw();

		let icon: HtmlImageElement = self.document.create_element("img").unwrap_throw().dyn_into().unwrap_throw();
		icon.set_class_name("card-icon-img");
		icon.set_alt("");
		icon.set_width(self.favicons.size());
		icon.set_height(self.favicons.size());
		icon.set_src(favicon::resolve(&item.url, &self.favicons).src());

		let content = self.create_html("div");
		content.set_class_name("card-content");
		let title = self.create_html("h2");
		title.set_text_content(Some(&item.title));
		let url = self.create_html("p");
		url.set_class_name("card-url");
		url.set_text_content(Some(&item.url));

		content.append_child(&title).unwrap_throw();
		content.append_child(&url).unwrap_throw();
		anchor.append_child(&icon).unwrap_throw();
		anchor.append_child(&content).unwrap_throw();
		card.append_child(&delete).unwrap_throw();
		card.append_child(&anchor).unwrap_throw();

		let mut card_listeners = Listeners::new(&card);
		spotlight(&mut card_listeners, &card);
		{
			let signals = self.signals.clone();
			let target: EventTarget = card.clone().into();
			let id = item.id.clone();
			card_listeners.listen("transitionend", move |event| {
				// Transitions of children bubble up here too.
				if event.target().as_ref() == Some(&target) {
					signals.dispatch(HostSignal::EffectFinished(id.clone()))
				}
			});
		}

		let mut icon_listeners = Listeners::new(&icon);
		{
			let icon = icon.clone();
			let id = item.id.clone();
			#[cfg(feature = "dangerous-logging")]
			let url = item.url.clone();
			icon_listeners.listen("error", move |_| {
				if icon.src() != FALLBACK_ICON {
					#[cfg(feature = "dangerous-logging")]
					debug!("{}", crate::error::Error::FaviconLoadFailed { url: url.clone() });
					debug!("Favicon of link {} failed to load. Using the fallback icon.", id);
					icon.set_src(FALLBACK_ICON)
				}
			});
		}

		trace!("Created card for {}.", item.id);
		DomCard {
			element: card,
			_card_listeners: card_listeners,
			_icon_listeners: icon_listeners,
		}
	}

	fn insert_card(&mut self, card: &DomCard, before: Option<&DomCard>) {
		let mut before = before.map(|before| &**before.element);
		if let Some(reference) = before {
			if reference.parent_node().as_ref() != Some(&*self.grid) {
				if STATIC_MAX_LEVEL >= Level::ERROR {
					error!("Reference card is not in the grid. Appending.");
				}
				before = None;
			}
		}
		if let Err(error) = self.grid.insert_before(&card.element, before) {
			error!("Failed to insert card: {:?}", error)
		}
	}

	fn set_phase(&mut self, card: &DomCard, phase: Phase) {
		let classes = card.element.class_list();
		let result = match phase {
			Phase::Entering => classes.add_1(ENTERING_CLASS),
			Phase::Steady => classes.remove_1(ENTERING_CLASS),
			Phase::Exiting => classes.add_1(EXITING_CLASS),
		};
		if let Err(error) = result {
			error!("Failed to set card phase {:?}: {:?}", phase, error)
		}
	}

	fn set_visible(&mut self, card: &DomCard, visible: bool) {
		let style = card.element.style();
		let result = if visible { style.remove_property("display").map(drop) } else { style.set_property("display", "none") };
		if let Err(error) = result {
			error!("Failed to set card visibility: {:?}", error)
		}
	}

	fn release_card(&mut self, card: DomCard) {
		card.element.remove();
		trace!("Released card {:?}.", card.element.dataset().get("id"));
	}

	fn schedule(&mut self, timer: TimerId, delay: Duration) {
		let signals = self.signals.clone();
		let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
		let timeout = Timeout::new(millis, move || signals.dispatch(HostSignal::TimerFired(timer)));
		if self.timers.insert(timer, timeout).is_some() {
			error!("{:?} was scheduled twice. The first one is cancelled.", timer)
		}
	}

	fn clear_timer(&mut self, timer: TimerId) {
		// Dropping a `Timeout` cancels it.
		self.timers.remove(&timer);
	}

	fn show_status(&mut self, status: &LoadState) {
		match status {
			LoadState::Ready => {
				if let Some(placeholder) = self.placeholder() {
					placeholder.remove()
				}
			}
			LoadState::Loading | LoadState::Unavailable { .. } => {
				let placeholder = match self.placeholder() {
					Some(placeholder) => placeholder,
					None => {
						let placeholder = self.create_html("p");
						placeholder.set_class_name("loading-message");
						if let Err(error) = self.grid.append_child(&placeholder) {
							return error!("Failed to show status: {:?}", error);
						}
						placeholder.into()
					}
				};
				let message = match status {
					LoadState::Unavailable { .. } => &self.unavailable_message,
					_ => &self.loading_message,
				};
				placeholder.set_text_content(Some(message));
			}
		}
	}
}

/// The id a card or delete button was tagged with.
pub(crate) fn link_id_of(element: &Element) -> Option<LinkId> {
	element.get_attribute("data-id").map(LinkId::new)
}
