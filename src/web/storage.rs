use super::firestore::backend_error;
use crate::{error::BackendError, gateway::Confirm, theme::PreferenceStore};
use async_trait::async_trait;
use tracing::warn;
use web_sys::Storage;

/// `window.localStorage`. Reads as empty and rejects writes if storage is unavailable (e.g. disabled by the user).
#[derive(Debug, Clone)]
pub struct LocalStorage(Option<Storage>);
impl LocalStorage {
	#[must_use]
	pub fn new() -> Self {
		let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
		if storage.is_none() {
			warn!("localStorage is unavailable. Preferences won't persist.");
		}
		Self(storage)
	}
}
impl Default for LocalStorage {
	fn default() -> Self {
		Self::new()
	}
}
impl PreferenceStore for LocalStorage {
	fn get(&self, key: &str) -> Option<String> {
		self.0.as_ref()?.get_item(key).ok().flatten()
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
		match &self.0 {
			Some(storage) => storage.set_item(key, value).map_err(|error| backend_error(&error)),
			None => Err(BackendError::new("localStorage is unavailable.")),
		}
	}
}

/// The browser's blocking `confirm()` dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserConfirm;

#[async_trait(?Send)]
impl Confirm for BrowserConfirm {
	async fn confirm(&self, prompt: &str) -> bool {
		web_sys::window().map_or(false, |window| window.confirm_with_message(prompt).unwrap_or(false))
	}
}
