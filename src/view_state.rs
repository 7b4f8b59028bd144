use crate::theme::Theme;

/// What the grid's placeholder shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
	/// Waiting for the first delivery.
	Loading,
	/// The feed delivered at least once. No placeholder.
	Ready,
	/// The feed failed. Shown in place of the list for the rest of the session.
	Unavailable { detail: String },
}

/// UI state that rendering reads from, instead of from globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
	pub theme: Theme,
	/// The raw search box contents.
	pub search_term: String,
	pub load: LoadState,
}
impl Default for ViewState {
	fn default() -> Self {
		Self {
			theme: Theme::default(),
			search_term: String::new(),
			load: LoadState::Loading,
		}
	}
}
