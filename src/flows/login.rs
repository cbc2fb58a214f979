//! Credential exchange against the token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Identity},
	error::ResponseError,
	flows::{
		SessionClient,
		common::{self, Bearer},
	},
	http::SessionTransport,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const KIND: FlowKind = FlowKind::Login;

impl<C> SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// Exchanges `credentials` for an access token and returns the decoded identity.
	///
	/// On success the explicit-logout marker is cleared before the token is stored, so the next
	/// start-up bootstraps again. On failure the session is left exactly as it was; rejected
	/// credentials surface as [`Error::Response`] with the server's status and body.
	pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange_credentials(credentials)).await;

		self.session.settle();
		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Convenience wrapper around [`SessionClient::login`].
	pub async fn login_with(
		&self,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Result<Identity> {
		let credentials = Credentials::new(email, password);

		self.login(&credentials).await
	}

	async fn exchange_credentials(&self, credentials: &Credentials) -> Result<Identity> {
		let url = self.config.token_url()?;
		let request = self.auth_request(&url, credentials, Bearer::Omit)?;
		let response = self.http_client.execute(request).await?;

		if !response.status().is_success() {
			return Err(ResponseError::new(response.status().as_u16(), response.body()).into());
		}

		let token = common::parse_access_token(&response)?;
		let identity = Identity::from_access_token(&token)?;

		self.marker_store.store(&self.config.marker_key, false).await?;
		self.session.tokens().set(Some(token));

		Ok(identity)
	}
}
