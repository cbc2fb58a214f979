//! Shared helpers for auth endpoint calls (request construction, token parsing).

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, DecodeError},
	flows::SessionClient,
	http::{self, ApiRequest, HttpRequest, HttpResponse, SessionTransport},
	intercept::RequestInterceptor,
};

/// Whether an auth endpoint call carries the current bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Bearer {
	Attach,
	Omit,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
	access: Option<String>,
}

impl<C> SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// Builds a credentialed JSON `POST` for an auth endpoint.
	///
	/// Auth endpoint responses never pass through the response interceptor.
	pub(crate) fn auth_request<B>(
		&self,
		url: &Url,
		body: &B,
		bearer: Bearer,
	) -> Result<HttpRequest, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let mut request =
			ApiRequest::post(url.as_str()).with_json(body)?.with_credentials().to_http(url)?;

		if bearer == Bearer::Attach {
			RequestInterceptor::new(self.session.tokens()).before_send(&mut request)?;
		}

		Ok(request)
	}
}

/// Extracts the `access` field of a token endpoint response.
pub(crate) fn parse_access_token(response: &HttpResponse) -> Result<TokenSecret, DecodeError> {
	let status = response.status();
	let parsed = http::decode_json::<AccessTokenResponse>(status, response.body())?;

	match parsed.access {
		Some(access) if !access.is_empty() => Ok(TokenSecret::new(access)),
		_ => Err(DecodeError::MissingAccessToken { status: status.as_u16() }),
	}
}
