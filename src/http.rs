//! Transport primitives for session-aware API calls.
//!
//! The module exposes [`SessionTransport`], the client's only dependency on an HTTP stack,
//! along with the caller-facing [`ApiRequest`]/[`ApiResponse`] pair. Each outbound
//! [`HttpRequest`] carries a [`CredentialsMode`] extension that tells the transport whether the
//! cookie jar participates, mirroring a browser's "send credentials" flag: auth endpoints are
//! always credentialed so the httpOnly refresh cookie travels with them, while ordinary API calls
//! authenticate with the bearer header alone.

// std
use std::ops::Deref;
// crates.io
use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header::CONTENT_TYPE};
#[cfg(feature = "reqwest")]
use reqwest::{
	cookie::{CookieStore, Jar},
	header::{COOKIE, SET_COOKIE},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError, ResponseError, TransportError},
};

/// Raw request handed to a [`SessionTransport`].
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Raw response produced by a [`SessionTransport`].
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`SessionTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Whether the transport should attach and accept cookies for a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CredentialsMode {
	/// Cookies are neither sent nor stored.
	#[default]
	Omit,
	/// Cookies from the jar are sent and `Set-Cookie` headers are stored.
	Include,
}
impl CredentialsMode {
	/// Reads the mode attached to a request, defaulting to [`CredentialsMode::Omit`].
	pub fn of(request: &HttpRequest) -> Self {
		request.extensions().get::<Self>().copied().unwrap_or_default()
	}
}

/// Abstraction over HTTP transports capable of executing session requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// every clone of the client, and their futures must be `Send` so request flows can hop
/// executors. A transport reports every HTTP response (including 4xx/5xx) as `Ok`; only failures
/// that prevented a response from arriving are returned as [`TransportError`].
pub trait SessionTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and returns the raw response.
	///
	/// Requests tagged with [`CredentialsMode::Include`] must carry the transport's cookies and
	/// persist any cookies the response sets.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Caller-facing request description, resolved against the configured base URL on send.
///
/// The value is cheap to clone, which lets the client replay it after a refresh without
/// mutating the caller's copy.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path (or absolute URL) relative to the base URL.
	pub path: String,
	/// Extra headers; `Authorization` is overwritten when a token is present.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Vec<u8>,
	/// Cookie participation for this request.
	pub credentials: CredentialsMode,
}
impl ApiRequest {
	/// Creates a request with no body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			headers: HeaderMap::new(),
			body: Vec::new(),
			credentials: CredentialsMode::Omit,
		}
	}

	/// `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Serializes `body` as JSON and sets the content type.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = serde_json::to_vec(body).map_err(ConfigError::RequestBody)?;
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Replaces the raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Inserts a header, replacing any previous value.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sends and accepts cookies for this request.
	pub fn with_credentials(mut self) -> Self {
		self.credentials = CredentialsMode::Include;

		self
	}

	/// Builds the raw transport request for `url`.
	pub(crate) fn to_http(&self, url: &Url) -> Result<HttpRequest, ConfigError> {
		let mut builder = ::http::Request::builder().method(self.method.clone()).uri(url.as_str());

		if let Some(headers) = builder.headers_mut() {
			headers.extend(self.headers.clone());
		}

		let mut request = builder.body(self.body.clone())?;

		request.extensions_mut().insert(self.credentials);

		Ok(request)
	}
}

/// Successful (2xx) response returned to callers.
#[derive(Debug)]
pub struct ApiResponse(HttpResponse);
impl ApiResponse {
	/// Wraps a raw transport response.
	pub fn new(response: HttpResponse) -> Self {
		Self(response)
	}

	/// HTTP status code.
	pub fn status(&self) -> StatusCode {
		self.0.status()
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		self.0.headers()
	}

	/// Raw body bytes.
	pub fn bytes(&self) -> &[u8] {
		self.0.body()
	}

	/// Body decoded lossily as UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(self.0.body()).into_owned()
	}

	/// Deserializes the JSON body, reporting the failing field path on error.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		decode_json(self.0.status(), self.0.body())
	}

	/// Returns the underlying raw response.
	pub fn into_inner(self) -> HttpResponse {
		self.0
	}

	/// Splits a raw response into success or a verbatim [`ResponseError`].
	pub(crate) fn from_http(response: HttpResponse) -> Result<Self, ResponseError> {
		if response.status().is_success() {
			Ok(Self(response))
		} else {
			Err(ResponseError::new(response.status().as_u16(), response.body()))
		}
	}
}
impl Deref for ApiResponse {
	type Target = HttpResponse;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Parses a JSON body with path-aware errors.
pub(crate) fn decode_json<T>(status: StatusCode, body: &[u8]) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	let de = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(de)
		.map_err(|source| DecodeError::Json { source, status: status.as_u16() })
}

/// Thin wrapper around [`ReqwestClient`] plus the cookie jar that holds the refresh cookie.
///
/// Automatic cookie handling on the inner client should stay disabled; the wrapper consults the
/// jar itself so that only [`CredentialsMode::Include`] requests see the refresh cookie.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
	client: ReqwestClient,
	jar: Arc<Jar>,
}
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`] with an empty cookie jar.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, jar: Default::default() }
	}

	/// Wraps an existing client and jar, e.g. to share cookies between client instances.
	pub fn with_jar(client: ReqwestClient, jar: Arc<Jar>) -> Self {
		Self { client, jar }
	}

	/// Cookie jar consulted for credentialed requests.
	pub fn jar(&self) -> &Arc<Jar> {
		&self.jar
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestHttpClient").field("client", &self.client).finish_non_exhaustive()
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl SessionTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let endpoint = request.uri().to_string();
			let mode = CredentialsMode::of(&request);
			let url = Url::parse(&endpoint)
				.map_err(|e| TransportError::network(endpoint.clone(), e))?;
			let mut request = request;

			if mode == CredentialsMode::Include {
				if let Some(cookies) = self.jar.cookies(&url) {
					request.headers_mut().insert(COOKIE, cookies);
				}
			}

			let request = reqwest::Request::try_from(request)
				.map_err(|e| TransportError::network(endpoint.clone(), e))?;
			let response = self
				.client
				.execute(request)
				.await
				.map_err(|e| TransportError::network(endpoint.clone(), e))?;
			let status = response.status();
			let headers = response.headers().to_owned();

			if mode == CredentialsMode::Include {
				self.jar.set_cookies(&mut headers.get_all(SET_COOKIE).iter(), &url);
			}

			let body = response
				.bytes()
				.await
				.map_err(|e| TransportError::network(endpoint.clone(), e))?
				.to_vec();
			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_request_builds_raw_request_with_credentials_extension() {
		let url = Url::parse("http://localhost:8001/accounts/").expect("Fixture URL should parse.");
		let request = ApiRequest::post("/accounts/")
			.with_json(&serde_json::json!({ "name": "Acme" }))
			.expect("JSON body should serialize.")
			.with_credentials()
			.to_http(&url)
			.expect("Raw request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "http://localhost:8001/accounts/");
		assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
		assert_eq!(request.body(), br#"{"name":"Acme"}"#);
		assert_eq!(CredentialsMode::of(&request), CredentialsMode::Include);
	}

	#[test]
	fn requests_default_to_omitting_credentials() {
		let url = Url::parse("http://localhost:8001/").expect("Fixture URL should parse.");
		let request = ApiRequest::get("/").to_http(&url).expect("Raw request should build.");

		assert_eq!(CredentialsMode::of(&request), CredentialsMode::Omit);
		assert!(request.body().is_empty());
	}

	#[test]
	fn non_success_responses_become_verbatim_errors() {
		let mut raw = HttpResponse::new(b"{\"detail\":\"nope\"}".to_vec());

		*raw.status_mut() = StatusCode::FORBIDDEN;

		let err = ApiResponse::from_http(raw).expect_err("403 should not be a success.");

		assert_eq!(err.status, 403);
		assert_eq!(err.body, "{\"detail\":\"nope\"}");
	}

	#[test]
	fn json_errors_report_the_failing_path() {
		#[derive(Debug, Deserialize)]
		#[allow(dead_code)]
		struct Account {
			id: u64,
		}

		let response = ApiResponse::new(HttpResponse::new(br#"{"id":"seven"}"#.to_vec()));
		let err = response.json::<Account>().expect_err("String ids should fail to decode.");

		match err {
			DecodeError::Json { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "id");
			},
			other => panic!("Unexpected decode error: {other:?}."),
		}
	}
}
