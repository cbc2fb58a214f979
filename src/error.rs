//! Session-level error types shared across flows, transports, and stores.

// self
use crate::_prelude::*;

/// Session-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical session error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Marker storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS) on a regular request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Server answered with a non-success status; passed through verbatim.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Access token payload could not be decoded into an identity.
	#[error(transparent)]
	Identity(#[from] crate::auth::IdentityError),

	/// Authentication failed and the refresh-and-retry cycle could not recover the session.
	#[error("Session expired and could not be renewed: {0}")]
	SessionExpired(#[from] RefreshError),
}
impl Error {
	/// HTTP status carried by the error, when the server produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Response(e) => Some(e.status),
			Self::SessionExpired(RefreshError::Rejected { status }) => Some(*status),
			Self::Decode(e) => Some(e.status()),
			_ => None,
		}
	}

	/// Returns `true` when the caller should treat the session as logged out.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired(_))
	}

	/// Returns `true` for a verbatim `401 Unauthorized` response.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Response(ResponseError { status: 401, .. }))
	}
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Request path cannot be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidRequestPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized to JSON.")]
	RequestBody(#[source] serde_json::Error),
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] crate::config::ClientConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {endpoint}.")]
	Network {
		/// Endpoint the request was addressed to.
		endpoint: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint: endpoint.into(), source: Box::new(src) }
	}
}

/// Non-success HTTP response surfaced to the caller without modification.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Server responded with HTTP {status}.")]
pub struct ResponseError {
	/// HTTP status code.
	pub status: u16,
	/// Response body, decoded lossily as UTF-8.
	pub body: String,
}
impl ResponseError {
	/// Builds an error from a status code and raw body bytes.
	pub fn new(status: u16, body: &[u8]) -> Self {
		Self { status, body: String::from_utf8_lossy(body).into_owned() }
	}
}

/// Response bodies that could not be decoded.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not the expected JSON shape.
	#[error("Response body is not valid JSON for the expected shape.")]
	Json {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Token endpoint answered without an access token.
	#[error("Token endpoint response is missing the access token.")]
	MissingAccessToken {
		/// HTTP status code of the response.
		status: u16,
	},
}
impl DecodeError {
	/// HTTP status of the response that failed to decode.
	pub fn status(&self) -> u16 {
		match self {
			Self::Json { status, .. } | Self::MissingAccessToken { status } => *status,
		}
	}
}

/// Outcome of a failed refresh cycle, shared by every caller that awaited it.
#[derive(Clone, Debug, ThisError)]
pub enum RefreshError {
	/// Refresh endpoint rejected the cookie (missing, expired, or revoked).
	#[error("Refresh endpoint rejected the session with HTTP {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// Refresh endpoint could not be reached.
	#[error("Network error occurred while refreshing the session.")]
	Network {
		/// Transport failure.
		#[source]
		source: Arc<TransportError>,
	},
	/// Refresh endpoint answered 2xx without a usable token.
	#[error("Refresh endpoint returned a malformed token response.")]
	Malformed {
		/// Decoding failure.
		#[source]
		source: Arc<DecodeError>,
	},
	/// Request construction failed before reaching the network.
	#[error("Refresh request could not be constructed.")]
	Config {
		/// Configuration failure.
		#[source]
		source: Arc<ConfigError>,
	},
	/// The session was logged out while the refresh was in flight; its token was discarded.
	#[error("Session was logged out while the refresh was in flight.")]
	LoggedOut,
	/// The task driving the refresh was dropped before it settled.
	///
	/// Only waiters inside the coordinator observe this; they start a fresh cycle instead.
	#[error("Refresh was abandoned before it completed.")]
	Abandoned,
}
impl From<TransportError> for RefreshError {
	fn from(e: TransportError) -> Self {
		Self::Network { source: Arc::new(e) }
	}
}
impl From<DecodeError> for RefreshError {
	fn from(e: DecodeError) -> Self {
		Self::Malformed { source: Arc::new(e) }
	}
}
impl From<ConfigError> for RefreshError {
	fn from(e: ConfigError) -> Self {
		Self::Config { source: Arc::new(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_is_exposed_for_server_errors() {
		let err = Error::from(ResponseError::new(401, b"{\"detail\":\"No active account\"}"));

		assert_eq!(err.status(), Some(401));
		assert!(err.is_unauthorized());
		assert!(!err.is_session_expired());

		let err = Error::from(RefreshError::Rejected { status: 401 });

		assert_eq!(err.status(), Some(401));
		assert!(err.is_session_expired());
		assert!(!err.is_unauthorized());
	}

	#[test]
	fn refresh_error_keeps_source_chain_when_cloned() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err = RefreshError::from(TransportError::Io(io));
		let cloned = err.clone();
		let source = StdError::source(&cloned).expect("Network refresh errors expose a source.");

		assert_eq!(source.to_string(), "I/O error occurred during transport.");
	}

	#[test]
	fn response_error_decodes_body_lossily() {
		let err = ResponseError::new(500, &[0x66, 0x6f, 0xff]);

		assert_eq!(err.status, 500);
		assert_eq!(err.body, "fo\u{fffd}");
	}
}
