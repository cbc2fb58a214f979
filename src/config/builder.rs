// self
use crate::{
	_prelude::*,
	config::{
		AuthEndpoints, ClientConfig, DEFAULT_LOGOUT_PATH, DEFAULT_MARKER_KEY, DEFAULT_REFRESH_PATH,
		DEFAULT_TOKEN_PATH,
	},
};

/// Errors raised while constructing or validating client configurations.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL must use HTTP or HTTPS.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry query strings or fragments.
	#[error("Base URL cannot carry a query or fragment: {url}.")]
	BaseUrlNotABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// HTTPS is required for non-loopback hosts.
	#[error("Base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint paths must be non-empty and relative to the base URL.
	#[error("The {endpoint} endpoint path must be a non-empty relative path: `{path}`.")]
	InvalidEndpointPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Marker key must be printable and non-empty.
	#[error("Logout marker key must be non-empty and printable.")]
	InvalidMarkerKey,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL every request path is resolved against.
	pub base_url: Url,
	/// Credential exchange path.
	pub token_path: String,
	/// Refresh path.
	pub refresh_path: String,
	/// Logout path.
	pub logout_path: String,
	/// Key of the durable explicit-logout flag.
	pub marker_key: String,
	/// Whether plain-HTTP base URLs are rejected for non-loopback hosts.
	pub require_https: bool,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the default endpoint layout.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			token_path: DEFAULT_TOKEN_PATH.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			logout_path: DEFAULT_LOGOUT_PATH.into(),
			marker_key: DEFAULT_MARKER_KEY.into(),
			require_https: false,
		}
	}

	/// Sets the credential exchange path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Sets the refresh path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Sets the logout path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.logout_path = path.into();

		self
	}

	/// Overrides the key of the durable explicit-logout flag.
	pub fn marker_key(mut self, key: impl Into<String>) -> Self {
		self.marker_key = key.into();

		self
	}

	/// Rejects plain-HTTP base URLs for non-loopback hosts.
	pub fn require_https(mut self, required: bool) -> Self {
		self.require_https = required;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			endpoints: AuthEndpoints {
				token: self.token_path,
				refresh: self.refresh_path,
				logout: self.logout_path,
			},
			marker_key: self.marker_key,
			require_https: self.require_https,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ClientConfigError> {
		validate_base_url(&self.base_url, self.require_https)?;
		validate_path("token", &self.endpoints.token)?;
		validate_path("refresh", &self.endpoints.refresh)?;
		validate_path("logout", &self.endpoints.logout)?;

		if self.marker_key.trim().is_empty() || self.marker_key.chars().any(char::is_control) {
			return Err(ClientConfigError::InvalidMarkerKey);
		}

		Ok(())
	}
}

fn validate_base_url(url: &Url, require_https: bool) -> Result<(), ClientConfigError> {
	match url.scheme() {
		"https" => {},
		"http" if !require_https || is_loopback(url) => {},
		"http" => return Err(ClientConfigError::InsecureBaseUrl { url: url.to_string() }),
		_ => return Err(ClientConfigError::UnsupportedScheme { url: url.to_string() }),
	}

	if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
		return Err(ClientConfigError::BaseUrlNotABase { url: url.to_string() });
	}

	Ok(())
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if path.trim().is_empty() || path.contains("://") || path.starts_with("//") {
		Err(ClientConfigError::InvalidEndpointPath { endpoint, path: path.to_owned() })
	} else {
		Ok(())
	}
}
