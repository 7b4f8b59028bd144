use tracing::{error, trace};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, EventTarget};

/// Event listeners attached to one [`EventTarget`], removed again when this is dropped.
///
/// The Rust closures live exactly as long as their registration, so a released card can't call into freed memory.
pub struct Listeners {
	target: EventTarget,
	bound: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}
impl Listeners {
	#[must_use]
	pub fn new(target: &EventTarget) -> Self {
		Self { target: target.clone(), bound: Vec::new() }
	}

	pub fn listen(&mut self, event: &'static str, handler: impl 'static + FnMut(Event)) {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
		if let Err(error) = self.target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
			return error!("Failed to add event listener {:?}: {:?}", event, error);
		}
		trace!("Added {:?} listener.", event);
		self.bound.push((event, closure));
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.bound.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.bound.is_empty()
	}
}
impl Drop for Listeners {
	fn drop(&mut self) {
		for (event, closure) in self.bound.drain(..) {
			if let Err(error) = self.target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
				error!("Failed to remove event listener {:?}: {:?}", event, error)
			}
		}
		trace!("Listeners released.");
	}
}
