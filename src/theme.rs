//! The dark/light theme preference.

use crate::error::BackendError;
use hashbrown::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
	#[default]
	Dark,
	Light,
}
impl Theme {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Theme::Dark => "dark",
			Theme::Light => "light",
		}
	}

	/// Anything but `"light"` is dark.
	#[must_use]
	pub fn parse(value: &str) -> Self {
		if value == "light" {
			Theme::Light
		} else {
			Theme::Dark
		}
	}

	#[must_use]
	pub fn toggled(self) -> Self {
		match self {
			Theme::Dark => Theme::Light,
			Theme::Light => Theme::Dark,
		}
	}
}

/// A persistent string key-value store, e.g. `localStorage`.
pub trait PreferenceStore {
	fn get(&self, key: &str) -> Option<String>;

	/// Failures are logged by the caller and otherwise ignored; the in-memory state stays authoritative for the session.
	///
	/// # Errors
	///
	/// If the value couldn't be persisted.
	fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences(HashMap<String, String>);
impl MemoryPreferences {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}
impl PreferenceStore for MemoryPreferences {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
		self.0.insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}

/// Loads the theme at startup and writes it back on every change.
#[derive(Debug)]
pub struct ThemeSwitch<S: PreferenceStore> {
	store: S,
	key: String,
	current: Theme,
}
impl<S: PreferenceStore> ThemeSwitch<S> {
	/// Reads the saved theme (defaulting to [`Theme::Dark`]) and persists it right away, as the page does on load.
	pub fn load(store: S, key: impl Into<String>) -> Self {
		let key = key.into();
		let current = store.get(&key).map_or_else(Theme::default, |saved| Theme::parse(&saved));
		let mut switch = Self { store, key, current };
		switch.set(current);
		switch
	}

	#[must_use]
	pub fn current(&self) -> Theme {
		self.current
	}

	pub fn set(&mut self, theme: Theme) {
		self.current = theme;
		debug!(theme = theme.as_str(), "Theme set.");
		if let Err(error) = self.store.set(&self.key, theme.as_str()) {
			warn!("Failed to persist theme: {}", error)
		}
	}

	pub fn toggle(&mut self) -> Theme {
		self.set(self.current.toggled());
		self.current
	}

	pub fn store(&self) -> &S {
		&self.store
	}
}
