#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A bookmark card grid kept in sync with a realtime ordered collection.
//!
//! Backend changes arrive through a [`ChangeSource`](`feed::ChangeSource`), are translated by a [`ChangeFeed`](`feed::ChangeFeed`)
//! and applied incrementally by a [`Reconciler`](`reconcile::Reconciler`) onto whatever [`ViewHost`](`reconcile::ViewHost`)
//! renders the grid. [`Board`](`board::Board`) wires these together.
//!
//! New links go through the [`SubmissionGateway`](`gateway::SubmissionGateway`) and only appear once the feed echoes them.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod board;
pub mod config;
pub mod error;
pub mod favicon;
pub mod feed;
pub mod form;
pub mod gateway;
pub mod headless;
pub mod memory;
pub mod model;
pub mod reconcile;
pub mod search;
pub mod theme;
pub mod view_state;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use board::Board;
pub use config::BoardConfig;
pub use error::{BackendError, Error, Result};
pub use model::{ChangeEvent, LinkId, LinkItem};
pub use reconcile::{Reconciler, ViewHost};
