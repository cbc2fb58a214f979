//! Client configuration: backend base URL, auth endpoint paths, and the logout marker key.
//!
//! Values are validated by [`ClientConfigBuilder::build`] (or [`ClientConfig::validate`] after
//! deserializing) so flows can resolve endpoints without re-checking them.

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default credential exchange path.
pub const DEFAULT_TOKEN_PATH: &str = "/api/token/";
/// Default refresh path.
pub const DEFAULT_REFRESH_PATH: &str = "/api/token/refresh/";
/// Default logout path.
pub const DEFAULT_LOGOUT_PATH: &str = "/api/logout/";
/// Default key of the explicit-logout flag.
pub const DEFAULT_MARKER_KEY: &str = "loggedOut";

/// Auth endpoint paths, resolved relative to [`ClientConfig::base_url`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
	/// Credential exchange endpoint (`POST {email, password}`).
	pub token: String,
	/// Cookie-backed refresh endpoint (`POST {}`).
	pub refresh: String,
	/// Server-side session invalidation endpoint.
	pub logout: String,
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self {
			token: DEFAULT_TOKEN_PATH.into(),
			refresh: DEFAULT_REFRESH_PATH.into(),
			logout: DEFAULT_LOGOUT_PATH.into(),
		}
	}
}

/// Immutable client configuration consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Base URL every request path is resolved against.
	pub base_url: Url,
	/// Auth endpoint paths.
	#[serde(default)]
	pub endpoints: AuthEndpoints,
	/// Key of the durable explicit-logout flag.
	#[serde(default = "ClientConfig::default_marker_key")]
	pub marker_key: String,
	/// Reject plain-HTTP base URLs unless they point at a loopback host.
	#[serde(default)]
	pub require_https: bool,
}
impl ClientConfig {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves a request path (or absolute URL) against the base URL.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidRequestPath { path: path.to_owned(), source })
	}

	/// Absolute URL of the credential exchange endpoint.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.endpoints.token)
	}

	/// Absolute URL of the refresh endpoint.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.endpoints.refresh)
	}

	/// Absolute URL of the logout endpoint.
	pub fn logout_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.endpoints.logout)
	}

	fn default_marker_key() -> String {
		DEFAULT_MARKER_KEY.into()
	}
}
