//! Cookie-backed access token refresh with single-flight deduplication.
//!
//! [`SessionClient::refresh`] posts an empty JSON body to the refresh endpoint with credentials
//! included, so the httpOnly refresh cookie travels with it. Concurrent callers share a single
//! network call through the session's [`RefreshCoordinator`](crate::session::RefreshCoordinator):
//! the leader writes the outcome into the token store (new token on success, cleared on
//! failure) before any waiter is released. A logout that lands while the call is in flight wins:
//! the late token is discarded and the cycle fails with [`RefreshError::LoggedOut`].

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{RefreshError, ResponseError},
	flows::{
		SessionClient,
		common::{self, Bearer},
	},
	http::SessionTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::RefreshOutcome,
};

const KIND: FlowKind = FlowKind::Refresh;

impl<C> SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// Exchanges the refresh cookie for a new access token, joining any cycle already in flight.
	pub async fn refresh(&self) -> Result<TokenSecret, RefreshError> {
		let span = FlowSpan::new(KIND, "refresh");
		let mut led = false;
		let outcome = span
			.instrument(self.session.refresh().run(|| {
				led = true;

				self.exchange_refresh_cookie()
			}))
			.await;

		if !led {
			self.refresh_metrics.record_join();
		}

		outcome
	}

	async fn exchange_refresh_cookie(&self) -> RefreshOutcome {
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let tokens = self.session.tokens();
		let generation = tokens.generation();
		let outcome = match self.request_refresh().await {
			Ok(token) if tokens.set_if_current(generation, Some(token.clone())) => Ok(token),
			Ok(_) => Err(RefreshError::LoggedOut),
			Err(e) => {
				tokens.set_if_current(generation, None);

				Err(e)
			},
		};

		match &outcome {
			Ok(token) => {
				self.refresh_metrics.record_success();
				obs::flow_debug(KIND, "rotated", &format_args!("token={}", token.fingerprint()));
			},
			Err(e) => {
				self.refresh_metrics.record_failure();
				obs::flow_debug(KIND, "cleared", e);
			},
		}

		obs::record_flow_outcome(KIND, FlowOutcome::of(&outcome));

		outcome
	}

	async fn request_refresh(&self) -> RefreshOutcome {
		let url = self.config.refresh_url()?;
		let request = self.auth_request(&url, &serde_json::json!({}), Bearer::Omit)?;
		let response = self.http_client.execute(request).await?;

		if !response.status().is_success() {
			let rejected = ResponseError::new(response.status().as_u16(), response.body());

			obs::flow_debug(KIND, "rejected", &rejected);

			return Err(RefreshError::Rejected { status: rejected.status });
		}

		Ok(common::parse_access_token(&response)?)
	}
}
