//! Authenticated API calls with refresh-and-replay on `401 Unauthorized`.
//!
//! Every request goes through the same loop: the request interceptor stamps the current token,
//! the transport executes, and the response interceptor decides whether to deliver or to refresh.
//! The attempt is switched to [`Attempt::Replay`] before the refresh starts, so a second 401 is
//! always delivered to the caller instead of looping.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	flows::SessionClient,
	http::{ApiRequest, ApiResponse, HttpResponse, SessionTransport},
	intercept::{Attempt, RequestInterceptor, ResponseInterceptor, Verdict},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const KIND: FlowKind = FlowKind::Request;

impl<C> SessionClient<C>
where
	C: ?Sized + SessionTransport,
{
	/// Sends `request`, refreshing and replaying it once if the first attempt returns 401.
	///
	/// Non-2xx responses are returned as [`Error::Response`]; a failed refresh surfaces as
	/// [`Error::SessionExpired`] and leaves the session cleared.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.send_with_replay(&request)).await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// `GET`s `path` and decodes the JSON body.
	pub async fn get<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		Ok(self.send(ApiRequest::get(path)).await?.json()?)
	}

	/// `POST`s `body` as JSON to `path` and decodes the JSON response.
	pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize + Sync,
		T: DeserializeOwned,
	{
		Ok(self.send(ApiRequest::post(path).with_json(body)?).await?.json()?)
	}

	/// `PATCH`es `path` with a JSON body and decodes the JSON response.
	pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize + Sync,
		T: DeserializeOwned,
	{
		Ok(self.send(ApiRequest::patch(path).with_json(body)?).await?.json()?)
	}

	/// `PUT`s `path` with a JSON body and decodes the JSON response.
	pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize + Sync,
		T: DeserializeOwned,
	{
		Ok(self.send(ApiRequest::put(path).with_json(body)?).await?.json()?)
	}

	/// `DELETE`s `path`; the raw response is returned since deletions usually carry no body.
	pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
		self.send(ApiRequest::delete(path)).await
	}

	async fn send_with_replay(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let url = self.config.resolve(&request.path)?;
		let mut attempt = Attempt::Initial;

		loop {
			let response = self.dispatch(request, &url).await?;

			match ResponseInterceptor.on_response(response.status(), attempt) {
				Verdict::Deliver => return Ok(ApiResponse::from_http(response)?),
				Verdict::RefreshAndReplay => {
					attempt = Attempt::Replay;

					obs::flow_debug(KIND, "unauthorized", &format_args!("{} {url}", request.method));
					self.refresh().await?;
				},
			}
		}
	}

	async fn dispatch(&self, request: &ApiRequest, url: &Url) -> Result<HttpResponse> {
		let mut raw = request.to_http(url)?;

		RequestInterceptor::new(self.session.tokens()).before_send(&mut raw)?;

		Ok(self.http_client.execute(raw).await?)
	}
}
