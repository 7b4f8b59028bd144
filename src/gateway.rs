//! Forwards create and delete requests to the backend.
//!
//! The gateway never touches the rendered list. A created link shows up only once the change feed echoes it back,
//! and a deleted one only leaves on the feed's removal.

use crate::{
	error::{BackendError, Error, Result},
	form::EntryForm,
	model::{LinkId, NewLink},
};
use async_trait::async_trait;
use std::{cell::RefCell, rc::Rc};
use tracing::{debug, error, info, instrument, warn};

/// The backend's write side.
#[async_trait(?Send)]
pub trait LinkStore {
	/// Inserts a document with `link`'s fields and a server-assigned `createdAt`.
	async fn create(&self, link: NewLink) -> Result<LinkId, BackendError>;

	async fn delete(&self, id: &LinkId) -> Result<(), BackendError>;
}

/// Asks the user to confirm a destructive action.
#[async_trait(?Send)]
pub trait Confirm {
	async fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
	/// The backend accepted the delete. The card leaves once the feed reports the removal.
	Requested,
	/// The user declined.
	Cancelled,
}

pub struct SubmissionGateway<S: LinkStore> {
	store: Rc<S>,
	form: Rc<RefCell<EntryForm>>,
	delete_prompt: String,
}
impl<S: LinkStore> SubmissionGateway<S> {
	pub fn new(store: Rc<S>, form: Rc<RefCell<EntryForm>>, delete_prompt: impl Into<String>) -> Self {
		Self {
			store,
			form,
			delete_prompt: delete_prompt.into(),
		}
	}

	#[must_use]
	pub fn form(&self) -> &Rc<RefCell<EntryForm>> {
		&self.form
	}

	/// Submits the entry form's contents. Closes and resets the form on success; leaves it open otherwise.
	///
	/// Not retried.
	///
	/// # Errors
	///
	/// [`Error::InvalidSubmission`] for blank fields (nothing is sent), [`Error::SubmissionFailed`] if the backend rejects the request.
	#[instrument(skip(self))]
	pub async fn submit(&self) -> Result<LinkId> {
		let link = match self.form.borrow().draft() {
			Ok(link) => link,
			Err(error) => {
				warn!("Not submitting: {}", error);
				return Err(error);
			}
		};

		match self.store.create(link).await {
			Ok(id) => {
				info!("Link {} created. Waiting for the feed to deliver it.", id);
				self.form.borrow_mut().close();
				Ok(id)
			}
			Err(error) => {
				let error = Error::SubmissionFailed(error);
				error!("{}", error);
				Err(error)
			}
		}
	}

	/// Deletes `id` after `confirm` agrees.
	///
	/// # Errors
	///
	/// [`Error::DeleteFailed`] if the backend rejects the request. The card stays where it is.
	#[instrument(skip(self, confirm))]
	pub async fn delete(&self, id: &LinkId, confirm: &impl Confirm) -> Result<DeleteOutcome> {
		if !confirm.confirm(&self.delete_prompt).await {
			debug!("Deletion of {} cancelled.", id);
			return Ok(DeleteOutcome::Cancelled);
		}

		match self.store.delete(id).await {
			Ok(()) => {
				info!("Link {} deleted. Waiting for the feed to remove it.", id);
				Ok(DeleteOutcome::Requested)
			}
			Err(source) => {
				let error = Error::DeleteFailed { id: id.clone(), source };
				error!("{}", error);
				Err(error)
			}
		}
	}
}
