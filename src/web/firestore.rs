//! The Firebase compat SDK's Firestore, as a [`ChangeSource`] and [`LinkStore`].

use crate::{
	error::BackendError,
	feed::{ChangeSource, CollectionQuery, Delivery, DeliverySink, Subscription},
	gateway::LinkStore,
	model::{ChangeKind, LinkFields, LinkId, NewLink, RawChange},
};
use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use std::{cell::RefCell, rc::Rc};
use tracing::{debug, error, warn};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
	#[derive(Debug, Clone)]
	type Firestore;

	#[wasm_bindgen(js_namespace = firebase, js_name = firestore)]
	fn firestore() -> Firestore;

	#[wasm_bindgen(method)]
	fn collection(this: &Firestore, path: &str) -> CollectionReference;

	type CollectionReference;

	#[wasm_bindgen(method, js_name = orderBy)]
	fn order_by(this: &CollectionReference, field: &str, direction: &str) -> Query;

	#[wasm_bindgen(method, catch)]
	fn add(this: &CollectionReference, data: &JsValue) -> Result<Promise, JsValue>;

	#[wasm_bindgen(method)]
	fn doc(this: &CollectionReference, id: &str) -> DocumentReference;

	type DocumentReference;

	#[wasm_bindgen(method, catch)]
	fn delete(this: &DocumentReference) -> Result<Promise, JsValue>;

	type Query;

	/// Returns the unsubscribe function.
	#[wasm_bindgen(method, js_name = onSnapshot)]
	fn on_snapshot(this: &Query, next: &Function, error: &Function) -> Function;

	#[wasm_bindgen(js_namespace = ["firebase", "firestore", "FieldValue"], js_name = serverTimestamp)]
	fn server_timestamp() -> JsValue;
}

/// A Firestore collection of link documents.
#[derive(Debug, Clone)]
pub struct FirestoreCollection {
	db: Firestore,
	collection: String,
	order_field: String,
}
impl FirestoreCollection {
	/// Uses the default Firebase app, which must already be initialized.
	pub fn new(collection: impl Into<String>, order_field: impl Into<String>) -> Self {
		Self {
			db: firestore(),
			collection: collection.into(),
			order_field: order_field.into(),
		}
	}
}

impl ChangeSource for FirestoreCollection {
	fn subscribe(&self, query: &CollectionQuery, sink: DeliverySink) -> Subscription {
		let sink = Rc::new(RefCell::new(sink));

		let on_next = {
			let sink = sink.clone();
			Closure::wrap(Box::new(move |snapshot: JsValue| deliver(&sink, parse_snapshot(&snapshot))) as Box<dyn FnMut(JsValue)>)
		};
		let on_error = Closure::wrap(Box::new(move |error: JsValue| deliver(&sink, Err(backend_error(&error)))) as Box<dyn FnMut(JsValue)>);

		let unsubscribe = self
			.db
			.collection(&query.collection)
			.order_by(&query.order_by, query.direction.as_str())
			.on_snapshot(on_next.as_ref().unchecked_ref(), on_error.as_ref().unchecked_ref());
		debug!(?query, "Subscribed to snapshots.");

		Subscription::new(move || {
			if let Err(error) = unsubscribe.call0(&JsValue::NULL) {
				error!("Failed to unsubscribe from snapshots: {:?}", error)
			}
			drop(on_next);
			drop(on_error);
		})
	}
}

#[async_trait(?Send)]
impl LinkStore for FirestoreCollection {
	async fn create(&self, link: NewLink) -> Result<LinkId, BackendError> {
		let data = serde_wasm_bindgen::to_value(&link).map_err(|error| BackendError::new(error.to_string()))?;
		Reflect::set(&data, &JsValue::from_str(&self.order_field), &server_timestamp()).map_err(|error| backend_error(&error))?;

		let promise = self.db.collection(&self.collection).add(&data).map_err(|error| backend_error(&error))?;
		let reference = JsFuture::from(promise).await.map_err(|error| backend_error(&error))?;
		Reflect::get(&reference, &JsValue::from_str("id"))
			.ok()
			.and_then(|id| id.as_string())
			.map(LinkId::new)
			.ok_or_else(|| BackendError::new("The created document reference has no id."))
	}

	async fn delete(&self, id: &LinkId) -> Result<(), BackendError> {
		let promise = self.db.collection(&self.collection).doc(id.as_str()).delete().map_err(|error| backend_error(&error))?;
		JsFuture::from(promise).await.map(drop).map_err(|error| backend_error(&error))
	}
}

fn deliver(sink: &RefCell<DeliverySink>, delivery: Delivery) {
	match sink.try_borrow_mut() {
		Ok(mut sink) => (*sink)(delivery),
		Err(_) => error!("Snapshot sink is busy. A re-entrant delivery was dropped."),
	}
}

/// Reads `code` and `message` off a thrown JS error, e.g. a `FirestoreError` or `DOMException`.
pub(super) fn backend_error(error: &JsValue) -> BackendError {
	let field = |name: &str| Reflect::get(error, &JsValue::from_str(name)).ok().and_then(|value| value.as_string());
	BackendError {
		code: field("code"),
		message: field("message").unwrap_or_else(|| format!("{:?}", error)),
	}
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, BackendError> {
	Reflect::get(target, &JsValue::from_str(key)).map_err(|error| backend_error(&error))
}

fn parse_snapshot(snapshot: &JsValue) -> Delivery {
	let doc_changes: Function = get(snapshot, "docChanges")?.dyn_into().map_err(|_| BackendError::new("Snapshot has no docChanges()."))?;
	let changes: Array = doc_changes
		.call0(snapshot)
		.map_err(|error| backend_error(&error))?
		.dyn_into()
		.map_err(|_| BackendError::new("docChanges() didn't return an array."))?;
	changes.iter().map(|change| parse_change(&change)).collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_change(change: &JsValue) -> Result<RawChange, BackendError> {
	let kind = match get(change, "type")?.as_string().as_deref() {
		Some("added") => ChangeKind::Added,
		Some("removed") => ChangeKind::Removed,
		Some("modified") => ChangeKind::Modified,
		other => return Err(BackendError::new(format!("Unknown change type {:?}.", other))),
	};

	let doc = get(change, "doc")?;
	let id = get(&doc, "id")?.as_string().map(LinkId::new).ok_or_else(|| BackendError::new("Changed document has no id."))?;

	let data: Function = get(&doc, "data")?.dyn_into().map_err(|_| BackendError::new("Changed document has no data()."))?;
	let data = data.call0(&doc).map_err(|error| backend_error(&error))?;
	let fields = serde_wasm_bindgen::from_value::<LinkFields>(data).unwrap_or_else(|_error| {
		// Deserialization errors can quote document contents.
		#[cfg(feature = "dangerous-logging")]
		warn!("Document {} is malformed ({}). Rendering it blank.", id, _error);
		#[cfg(not(feature = "dangerous-logging"))]
		warn!("Document {} is malformed. Rendering it blank.", id);
		LinkFields::default()
	});

	// -1 for removals.
	let new_index = get(change, "newIndex")?.as_f64().filter(|index| *index >= 0.0).map(|index| index as usize);

	Ok(RawChange {
		kind,
		item: fields.into_item(id),
		new_index,
	})
}
