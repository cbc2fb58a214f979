//! Helpers shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
#[cfg(feature = "reqwest")] use httpmock::MockServer;
// self
#[cfg(feature = "reqwest")]
use session_broker::{flows::ReqwestSessionClient, http::ReqwestHttpClient};
use session_broker::{
	config::ClientConfig,
	store::{MarkerStore, MemoryMarkerStore},
	url::Url,
};

/// Builds an unsigned JWT whose payload carries `sub` and `jti`.
pub fn jwt(subject: &str, token_id: &str) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(
		serde_json::json!({
			"token_type": "access",
			"sub": subject,
			"jti": token_id,
			"iat": 1_735_689_600,
			"exp": 4_102_444_800_i64,
		})
		.to_string(),
	);

	format!("{header}.{payload}.signature")
}

/// Configuration with the default endpoint layout rooted at `base_url`.
pub fn config_for(base_url: &str) -> ClientConfig {
	ClientConfig::builder(Url::parse(base_url).expect("Test base URL should parse."))
		.build()
		.expect("Test configuration should validate.")
}

/// Upcasts a shared in-memory marker store for client construction.
pub fn marker_store(markers: &MemoryMarkerStore) -> Arc<dyn MarkerStore> {
	Arc::new(markers.clone())
}

/// Client against `server` that shares `markers` and the cookie jar of `http_client`.
///
/// Building a second client from the same store and transport simulates a process restart:
/// the durable marker and the browser cookie survive while the in-memory token does not.
#[cfg(feature = "reqwest")]
pub fn client_for(
	server: &MockServer,
	markers: &MemoryMarkerStore,
	http_client: &ReqwestHttpClient,
) -> ReqwestSessionClient {
	ReqwestSessionClient::with_http_client(
		config_for(&server.base_url()),
		marker_store(markers),
		http_client.clone(),
	)
}

/// Fresh client with its own marker store and cookie jar.
#[cfg(feature = "reqwest")]
pub fn new_client(server: &MockServer) -> (ReqwestSessionClient, MemoryMarkerStore) {
	let markers = MemoryMarkerStore::default();
	let client = client_for(server, &markers, &ReqwestHttpClient::default());

	(client, markers)
}
