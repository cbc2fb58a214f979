//! Volatile session state: the access token and the refresh single-flight slot.
//!
//! A [`Session`] is the single source of truth the request interceptor consults. It is owned by
//! one client (shared between its clones through `Arc`) rather than living in ambient globals,
//! so the single-flight invariant can be tested in isolation.

pub mod coordinator;
pub mod token;

pub use coordinator::*;
pub use token::*;

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::_prelude::*;

/// Coarse authentication state exposed to UI collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
	/// Start-up has not decided yet (bootstrap, login, or logout has not finished).
	Pending,
	/// An access token is held.
	Authenticated,
	/// No access token is held.
	Anonymous,
}

/// Access token cell plus the refresh coordinator guarding it.
#[derive(Debug, Default)]
pub struct Session {
	tokens: TokenStore,
	refresh: RefreshCoordinator,
	settled: AtomicBool,
}
impl Session {
	/// Current access token holder.
	pub fn tokens(&self) -> &TokenStore {
		&self.tokens
	}

	/// Single-flight refresh coordinator.
	pub fn refresh(&self) -> &RefreshCoordinator {
		&self.refresh
	}

	/// Returns the coarse authentication state.
	pub fn status(&self) -> SessionStatus {
		if self.tokens.is_present() {
			SessionStatus::Authenticated
		} else if self.settled.load(Ordering::Acquire) {
			SessionStatus::Anonymous
		} else {
			SessionStatus::Pending
		}
	}

	/// Marks the initial authentication decision as made.
	pub(crate) fn settle(&self) {
		self.settled.store(true, Ordering::Release);
	}
}
