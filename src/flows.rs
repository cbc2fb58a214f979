//! Session flows exposed through the [`SessionClient`] facade.

pub mod bootstrap;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod request;

mod common;

pub use refresh::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{Identity, IdentityError, TokenSecret},
	config::ClientConfig,
	http::SessionTransport,
	session::{Session, SessionStatus},
	store::MarkerStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestSessionClient = SessionClient<ReqwestHttpClient>;

/// Keeps an authenticated session against a cookie-refresh backend.
///
/// The client owns the transport, the durable logout marker, and the volatile [`Session`]. Clones
/// share all of them, so every clone sees the same access token and joins the same refresh
/// cycle.
pub struct SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Validated endpoint configuration.
	pub config: ClientConfig,
	/// Durable storage for the explicit-logout marker.
	pub marker_store: Arc<dyn MarkerStore>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	session: Arc<Session>,
}
impl<C> SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		config: ClientConfig,
		marker_store: Arc<dyn MarkerStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			config,
			marker_store,
			refresh_metrics: Default::default(),
			session: Default::default(),
		}
	}

	/// Current access token, if any.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.session.tokens().get()
	}

	/// Returns `true` while an access token is held.
	pub fn is_authenticated(&self) -> bool {
		self.session.tokens().is_present()
	}

	/// Identity decoded from the current access token; `None` when logged out.
	pub fn identity(&self) -> Result<Option<Identity>, IdentityError> {
		self.access_token().as_ref().map(Identity::from_access_token).transpose()
	}

	/// Coarse authentication state for UI gating.
	pub fn status(&self) -> SessionStatus {
		self.session.status()
	}

	/// Shared volatile session state.
	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}
}
#[cfg(feature = "reqwest")]
impl SessionClient<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest transport and cookie jar.
	///
	/// Use [`SessionClient::with_http_client`] to supply a tuned [`ReqwestHttpClient`] (timeouts,
	/// TLS roots) or a jar shared with another client.
	pub fn new(config: ClientConfig, marker_store: Arc<dyn MarkerStore>) -> Self {
		Self::with_http_client(config, marker_store, ReqwestHttpClient::default())
	}
}
impl<C> Clone for SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			marker_store: self.marker_store.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			session: self.session.clone(),
		}
	}
}
impl<C> Debug for SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("config", &self.config)
			.field("status", &self.status())
			.field("refresh_metrics", &self.refresh_metrics)
			.finish_non_exhaustive()
	}
}
