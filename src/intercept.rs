//! Hooks applied around every regular API call.
//!
//! The request side stamps the current access token onto outgoing requests. The response side
//! inspects the status together with the request's [`Attempt`] and decides whether the caller
//! receives the response or the client refreshes and replays once. Auth endpoints never pass
//! through these hooks.

// crates.io
use ::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
// self
use crate::{_prelude::*, error::ConfigError, http::HttpRequest, session::TokenStore};

/// Position of a request in its retry sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attempt {
	/// First delivery.
	Initial,
	/// Replay after a successful refresh; never retried again.
	Replay,
}

/// Decision taken by [`ResponseInterceptor::on_response`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
	/// Hand the response to the caller unchanged.
	Deliver,
	/// Refresh the access token and replay the request once.
	RefreshAndReplay,
}

/// Attaches `Authorization: Bearer <token>` when a token is held.
#[derive(Clone, Copy, Debug)]
pub struct RequestInterceptor<'a> {
	tokens: &'a TokenStore,
}
impl<'a> RequestInterceptor<'a> {
	/// Creates an interceptor reading from `tokens`.
	pub fn new(tokens: &'a TokenStore) -> Self {
		Self { tokens }
	}

	/// Stamps the current token onto `request`; leaves it untouched when no token is held.
	pub fn before_send(&self, request: &mut HttpRequest) -> Result<(), ConfigError> {
		let Some(token) = self.tokens.get() else {
			return Ok(());
		};
		let mut value = HeaderValue::from_str(&token.bearer()).map_err(::http::Error::from)?;

		value.set_sensitive(true);
		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(())
	}
}

/// Maps response statuses onto retry decisions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseInterceptor;
impl ResponseInterceptor {
	/// Only a first-attempt `401 Unauthorized` triggers a refresh.
	pub fn on_response(&self, status: StatusCode, attempt: Attempt) -> Verdict {
		match (status, attempt) {
			(StatusCode::UNAUTHORIZED, Attempt::Initial) => Verdict::RefreshAndReplay,
			_ => Verdict::Deliver,
		}
	}
}
