//! The browser binding: a DOM [`ViewHost`](`crate::reconcile::ViewHost`), the Firestore collection, `localStorage`
//! preferences and [`mount`], which wires them onto the hosted page.

mod app;
mod firestore;
mod host;
mod listeners;
mod storage;

pub use app::{mount, MountedBoard};
pub use firestore::FirestoreCollection;
pub use host::{DomCard, DomHost, SignalDispatcher};
pub use listeners::Listeners;
pub use storage::{BrowserConfirm, LocalStorage};
