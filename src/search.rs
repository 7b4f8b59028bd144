//! Case-insensitive substring search over the rendered links.
//!
//! Pure: computes visibility and nothing else. Applying it is up to the caller.

use crate::model::{LinkId, LinkItem};

/// The normalized form of a raw search box value.
#[must_use]
pub fn normalize(query: &str) -> String {
	query.trim().to_lowercase()
}

/// Whether `item` is visible for an already [`normalize`]d query.
#[must_use]
pub fn matches(normalized_query: &str, item: &LinkItem) -> bool {
	normalized_query.is_empty() || item.title.to_lowercase().contains(normalized_query) || item.url.to_lowercase().contains(normalized_query)
}

/// Visibility of each of `items` for the raw `query`, in iteration order.
pub fn visibility<'a>(query: &str, items: impl IntoIterator<Item = &'a LinkItem>) -> Vec<(LinkId, bool)> {
	let query = normalize(query);
	items.into_iter().map(|item| (item.id.clone(), matches(&query, item))).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn items() -> Vec<LinkItem> {
		vec![LinkItem::new("1", "Go", "https://go.dev"), LinkItem::new("2", "Rust", "https://rust-lang.org")]
	}

	#[test]
	fn matches_title_or_url_ignoring_case() {
		let items = items();
		assert_eq!(visibility("  GO ", &items), vec![(LinkId::from("1"), true), (LinkId::from("2"), false)]);
		assert_eq!(visibility("LANG", &items), vec![(LinkId::from("1"), false), (LinkId::from("2"), true)]);
	}

	#[test]
	fn blank_query_shows_everything() {
		let items = items();
		assert!(visibility("", &items).iter().all(|(_, visible)| *visible));
		assert!(visibility("   ", &items).iter().all(|(_, visible)| *visible));
	}

	#[test]
	fn repeated_calls_agree() {
		let items = items();
		assert_eq!(visibility("rust", &items), visibility("rust", &items));
	}
}
