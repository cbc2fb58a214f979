//! Demonstrates logging in, riding out an expired access token, and logging out against a mocked
//! backend with the default reqwest transport and in-memory logout marker.

// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use session_broker::{
	config::{ClientConfig, DEFAULT_MARKER_KEY},
	flows::ReqwestSessionClient,
	store::{MarkerStore, MemoryMarkerStore},
};

fn demo_token(token_id: &str) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
	let claims = json!({ "user_id": 42, "jti": token_id, "exp": 4_102_444_800_i64 });
	let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

	format!("{header}.{payload}.")
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let first = demo_token("first");
	let second = demo_token("second");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200)
				.header("set-cookie", "refresh_token=demo; HttpOnly; Path=/api/token/refresh/")
				.json_body(json!({ "access": first }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/accounts/")
				.header("authorization", format!("Bearer {first}"));
			then.status(401).json_body(json!({ "detail": "Token is expired" }));
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/").header("cookie", "refresh_token=demo");
			then.status(200).json_body(json!({ "access": second }));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/accounts/")
				.header("authorization", format!("Bearer {second}"));
			then.status(200).json_body(json!([{ "id": 1, "name": "Acme" }]));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/logout/");
			then.status(205);
		})
		.await;

	let markers = MemoryMarkerStore::default();
	let marker_store: Arc<dyn MarkerStore> = Arc::new(markers.clone());
	let config = ClientConfig::builder(Url::parse(&server.base_url())?).build()?;
	let client = ReqwestSessionClient::new(config, marker_store);

	println!("Silent bootstrap restored a session: {}.", client.bootstrap().await);

	let identity = client.login_with("demo@example.com", "demo-password").await?;

	println!("Logged in as {:?}.", identity.subject);

	let accounts = client.get::<serde_json::Value>("/api/accounts/").await?;

	println!("Accounts after a transparent refresh: {accounts}.");
	println!("Current token fingerprint: {:?}.", client.access_token().map(|t| t.fingerprint()));

	client.logout().await?;

	println!(
		"Logged out; status {:?}, marker set: {}.",
		client.status(),
		markers.get(DEFAULT_MARKER_KEY)
	);

	refresh_mock.assert_async().await;

	Ok(())
}
