//! Runtime configuration.
//!
//! Everything here has a default matching the hosted page, so an empty object (or [`BoardConfig::default()`]) is a valid configuration.

use crate::feed::{CollectionQuery, Direction, Placement};
use core::time::Duration;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
	/// Name of the backend collection holding the links.
	pub collection: String,
	/// Server-assigned timestamp field the collection is ordered by (descending).
	pub order_field: String,
	pub placement: Placement,
	/// Delay before an entering card flips to its steady state.
	///
	/// Must be long enough for the pre-transition state to be painted.
	pub enter_delay_ms: u32,
	/// Upper bound on how long an exiting card waits for its exit effect to finish.
	pub exit_fallback_ms: u32,
	/// Favicon service URL template. `{host}` and `{size}` are substituted.
	pub favicon_service: String,
	pub favicon_size: u32,
	/// Preference key the theme is stored under.
	pub theme_key: String,
	pub delete_prompt: String,
	pub loading_message: String,
	/// Shown in place of the grid when the feed fails. The failure detail goes to the log.
	pub unavailable_message: String,
}
impl Default for BoardConfig {
	fn default() -> Self {
		Self {
			collection: "links".to_owned(),
			order_field: "createdAt".to_owned(),
			placement: Placement::Indexed,
			enter_delay_ms: 10,
			exit_fallback_ms: 600,
			favicon_service: "https://www.google.com/s2/favicons?domain={host}&sz={size}".to_owned(),
			favicon_size: 24,
			theme_key: "theme".to_owned(),
			delete_prompt: "Delete this link?".to_owned(),
			loading_message: "Loading links…".to_owned(),
			unavailable_message: "Error: the link feed is unavailable (the backend may require an index). See the console for details.".to_owned(),
		}
	}
}
impl BoardConfig {
	#[must_use]
	pub fn query(&self) -> CollectionQuery {
		CollectionQuery {
			collection: self.collection.clone(),
			order_by: self.order_field.clone(),
			direction: Direction::Descending,
		}
	}

	#[must_use]
	pub fn enter_delay(&self) -> Duration {
		Duration::from_millis(self.enter_delay_ms.into())
	}

	#[must_use]
	pub fn exit_fallback(&self) -> Duration {
		Duration::from_millis(self.exit_fallback_ms.into())
	}

	#[must_use]
	pub fn timings(&self) -> Timings {
		Timings {
			enter_delay: self.enter_delay(),
			exit_fallback: self.exit_fallback(),
		}
	}

	#[must_use]
	pub fn favicon_service(&self) -> crate::favicon::FaviconService {
		crate::favicon::FaviconService::new(self.favicon_service.clone(), self.favicon_size)
	}
}

/// Transition timings used by the [`Reconciler`](`crate::reconcile::Reconciler`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
	pub enter_delay: Duration,
	pub exit_fallback: Duration,
}
impl Default for Timings {
	fn default() -> Self {
		BoardConfig::default().timings()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_hosted_page() {
		let config = BoardConfig::default();
		let query = config.query();
		assert_eq!(query.collection, "links");
		assert_eq!(query.order_by, "createdAt");
		assert_eq!(query.direction, Direction::Descending);
		assert_eq!(config.enter_delay(), Duration::from_millis(10));
		assert!(config.exit_fallback() > config.enter_delay());
	}

	#[test]
	fn partial_config_keeps_defaults() {
		let config: BoardConfig = serde_json::from_str(r#"{"collection":"bookmarks","exitFallbackMs":250,"placement":"append"}"#).unwrap();
		assert_eq!(config.collection, "bookmarks");
		assert_eq!(config.exit_fallback_ms, 250);
		assert_eq!(config.placement, Placement::Append);
		assert_eq!(config.theme_key, "theme");
	}
}
