//! Silent session restore on application start.
//!
//! A leftover refresh cookie is only honoured when the user did not log out on purpose; the
//! durable marker written by logout vetoes the refresh without touching the network.

// self
use crate::{
	auth::Identity,
	flows::SessionClient,
	http::SessionTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const KIND: FlowKind = FlowKind::Bootstrap;

impl<C> SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// Attempts to restore the session from the refresh cookie; returns `true` on success.
	///
	/// Never fails: a set (or unreadable) logout marker, a rejected refresh, or an undecodable
	/// token all yield `false` and leave the client logged out.
	pub async fn bootstrap(&self) -> bool {
		let span = FlowSpan::new(KIND, "bootstrap");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let restored = span.instrument(self.restore_session()).await;

		self.session.settle();
		obs::record_flow_outcome(
			KIND,
			if restored { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		restored
	}

	async fn restore_session(&self) -> bool {
		match self.marker_store.load(&self.config.marker_key).await {
			Ok(false) => {},
			Ok(true) => {
				obs::flow_debug(KIND, "marker", &"explicit logout recorded; refresh skipped");

				return false;
			},
			Err(e) => {
				obs::flow_warning(KIND, "marker", &e);

				return false;
			},
		}

		let token = match self.refresh().await {
			Ok(token) => token,
			Err(e) => {
				obs::flow_debug(KIND, "refresh", &e);

				return false;
			},
		};

		match Identity::from_access_token(&token) {
			Ok(_) => true,
			Err(e) => {
				obs::flow_warning(KIND, "identity", &e);
				self.session.tokens().set(None);

				false
			},
		}
	}
}
