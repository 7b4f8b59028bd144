//! State of the modal "add link" form.

use crate::{
	error::{Error, Result},
	model::NewLink,
};

/// The entry form. Values are kept raw, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
	open: bool,
	title: String,
	url: String,
}
impl EntryForm {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		self.open
	}

	pub fn open(&mut self) {
		self.open = true;
	}

	/// Hides the form and resets its fields.
	pub fn close(&mut self) {
		*self = Self::default();
	}

	#[must_use]
	pub fn title(&self) -> &str {
		&self.title
	}

	#[must_use]
	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn set_title(&mut self, title: impl Into<String>) {
		self.title = title.into();
	}

	pub fn set_url(&mut self, url: impl Into<String>) {
		self.url = url.into();
	}

	/// Handles a key press anywhere on the page. Returns whether the key was consumed.
	pub fn handle_key(&mut self, key: &str) -> bool {
		if key == "Escape" && self.open {
			self.close();
			true
		} else {
			false
		}
	}

	/// The create request this form would submit.
	///
	/// # Errors
	///
	/// [`Error::InvalidSubmission`] if the title or URL is blank.
	pub fn draft(&self) -> Result<NewLink> {
		if self.title.trim().is_empty() {
			return Err(Error::InvalidSubmission("a title is required"));
		}
		if self.url.trim().is_empty() {
			return Err(Error::InvalidSubmission("a URL is required"));
		}
		Ok(NewLink {
			title: self.title.clone(),
			url: self.url.clone(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escape_closes_and_resets_an_open_form() {
		let mut form = EntryForm::new();
		assert!(!form.handle_key("Escape"));

		form.open();
		form.set_title("Go");
		assert!(!form.handle_key("Enter"));
		assert!(form.handle_key("Escape"));
		assert_eq!(form, EntryForm::new());
	}

	#[test]
	fn draft_keeps_raw_values() {
		let mut form = EntryForm::new();
		form.set_title(" Go ");
		form.set_url("https://go.dev");
		assert_eq!(
			form.draft().unwrap(),
			NewLink {
				title: " Go ".to_owned(),
				url: "https://go.dev".to_owned()
			}
		);
	}

	#[test]
	fn blank_fields_are_rejected() {
		let mut form = EntryForm::new();
		form.set_title("Go");
		form.set_url("   ");
		assert!(matches!(form.draft(), Err(Error::InvalidSubmission(_))));
	}
}
