//! In-memory access token cell.

// self
use crate::{_prelude::*, auth::TokenSecret};

#[derive(Debug, Default)]
struct TokenSlot {
	token: Option<TokenSecret>,
	generation: u64,
}

/// Process-wide holder of the current access token; never persisted.
///
/// Every logout bumps the slot's generation, so a refresh started before the logout can tell that
/// its result no longer belongs to the session.
#[derive(Debug, Default)]
pub struct TokenStore(RwLock<TokenSlot>);
impl TokenStore {
	/// Returns a copy of the current token, if any.
	pub fn get(&self) -> Option<TokenSecret> {
		self.0.read().token.clone()
	}

	/// Returns `true` while a token is held.
	pub fn is_present(&self) -> bool {
		self.0.read().token.is_some()
	}

	/// Replaces (or clears) the current token.
	pub(crate) fn set(&self, token: Option<TokenSecret>) {
		self.0.write().token = token;
	}

	pub(crate) fn generation(&self) -> u64 {
		self.0.read().generation
	}

	/// Replaces the token only if no logout happened since `generation` was read.
	pub(crate) fn set_if_current(&self, generation: u64, token: Option<TokenSecret>) -> bool {
		let mut slot = self.0.write();

		if slot.generation != generation {
			return false;
		}

		slot.token = token;

		true
	}

	/// Clears the token and invalidates every refresh still in flight.
	pub(crate) fn revoke(&self) {
		let mut slot = self.0.write();

		slot.token = None;
		slot.generation += 1;
	}
}
