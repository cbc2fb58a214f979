//! Best-effort server logout followed by unconditional local teardown.

// self
use crate::{
	_prelude::*,
	error::ResponseError,
	flows::{SessionClient, common::Bearer},
	http::SessionTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const KIND: FlowKind = FlowKind::Logout;

impl<C> SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// Logs out locally regardless of what the server says.
	///
	/// The logout endpoint is called first; its failures are logged and swallowed. The access
	/// token is then cleared and the explicit-logout marker set. A refresh still in flight at that
	/// point cannot bring the token back. The only error returned is a marker persistence failure,
	/// by which point the token is already gone.
	pub async fn logout(&self) -> Result<()> {
		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.tear_down()).await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	async fn tear_down(&self) -> Result<()> {
		if let Err(e) = self.invalidate_server_session().await {
			obs::flow_warning(KIND, "server_logout", &e);
		}

		self.session.tokens().revoke();
		self.session.settle();
		self.marker_store.store(&self.config.marker_key, true).await?;

		Ok(())
	}

	async fn invalidate_server_session(&self) -> Result<()> {
		let url = self.config.logout_url()?;
		let request = self.auth_request(&url, &serde_json::json!({}), Bearer::Attach)?;
		let response = self.http_client.execute(request).await?;

		if response.status().is_success() {
			Ok(())
		} else {
			Err(ResponseError::new(response.status().as_u16(), response.body()).into())
		}
	}
}
