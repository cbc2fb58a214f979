#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use session_broker::{
	auth::Credentials, config::DEFAULT_MARKER_KEY, error::Error, http::ReqwestHttpClient,
	session::SessionStatus, store::MemoryMarkerStore,
};

#[tokio::test]
async fn login_stores_token_and_requests_carry_it() {
	let server = MockServer::start_async().await;
	let t1 = common::jwt("user-1", "t1");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token/")
				.json_body(json!({ "email": "a@b.com", "password": "pw" }));
			then.status(200).json_body(json!({ "access": t1 }));
		})
		.await;
	let items_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/items/").header("authorization", format!("Bearer {t1}"));
			then.status(200).json_body(json!([{ "id": 1 }]));
		})
		.await;
	let (client, markers) = common::new_client(&server);

	assert_eq!(client.status(), SessionStatus::Pending);

	let identity = client.login_with("a@b.com", "pw").await.expect("Login should succeed.");

	assert_eq!(identity.subject.as_deref(), Some("user-1"));
	assert_eq!(client.access_token().as_ref().map(|t| t.expose().to_owned()), Some(t1.clone()));
	assert_eq!(client.status(), SessionStatus::Authenticated);
	assert!(!markers.get(DEFAULT_MARKER_KEY));

	let items = client
		.get::<serde_json::Value>("/api/items/")
		.await
		.expect("Authenticated request should succeed.");

	assert_eq!(items, json!([{ "id": 1 }]));

	token_mock.assert_calls_async(1).await;
	items_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn rejected_credentials_surface_verbatim_and_leave_session_untouched() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(401).json_body(json!({ "detail": "No active account found" }));
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/");
			then.status(200).json_body(json!({ "access": "unexpected" }));
		})
		.await;
	let (client, _) = common::new_client(&server);
	let err = client
		.login(&Credentials::new("a@b.com", "wrong"))
		.await
		.expect_err("Bad credentials should fail.");

	match err {
		Error::Response(response) => {
			assert_eq!(response.status, 401);
			assert!(response.body.contains("No active account found"));
		},
		other => panic!("Unexpected login error: {other:?}."),
	}

	assert!(!client.is_authenticated());
	assert_eq!(client.status(), SessionStatus::Anonymous);

	token_mock.assert_calls_async(1).await;
	refresh_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn opaque_login_token_is_rejected_without_storing_it() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200).json_body(json!({ "access": "opaque" }));
		})
		.await;

	let (client, markers) = common::new_client(&server);

	markers.set(DEFAULT_MARKER_KEY, true);

	let err = client.login_with("a@b.com", "pw").await.expect_err("Opaque tokens cannot be decoded.");

	assert!(matches!(err, Error::Identity(_)));
	assert!(!client.is_authenticated());
	assert!(markers.get(DEFAULT_MARKER_KEY), "A failed login must not clear the marker.");
}

#[tokio::test]
async fn logout_swallows_server_failure_and_sets_marker() {
	let server = MockServer::start_async().await;
	let t1 = common::jwt("user-1", "t1");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200).json_body(json!({ "access": t1 }));
		})
		.await;

	let logout_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/logout/").header("authorization", format!("Bearer {t1}"));
			then.status(500).body("boom");
		})
		.await;
	let (client, markers) = common::new_client(&server);

	client.login_with("a@b.com", "pw").await.expect("Login should succeed.");
	client.logout().await.expect("Logout should ignore server failures.");

	assert!(!client.is_authenticated());
	assert_eq!(client.status(), SessionStatus::Anonymous);
	assert!(markers.get(DEFAULT_MARKER_KEY));

	logout_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn logout_completes_when_the_server_is_unreachable() {
	let markers = MemoryMarkerStore::default();
	let client = session_broker::flows::ReqwestSessionClient::with_http_client(
		common::config_for("http://127.0.0.1:9"),
		common::marker_store(&markers),
		ReqwestHttpClient::default(),
	);

	client.logout().await.expect("Network failures on logout should be swallowed.");

	assert!(markers.get(DEFAULT_MARKER_KEY));
	assert_eq!(client.status(), SessionStatus::Anonymous);
}

#[tokio::test]
async fn bootstrap_respects_the_logout_marker() {
	let server = MockServer::start_async().await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/");
			then.status(200).json_body(json!({ "access": common::jwt("user-1", "t2") }));
		})
		.await;
	let (client, markers) = common::new_client(&server);

	markers.set(DEFAULT_MARKER_KEY, true);

	assert!(!client.bootstrap().await);
	assert!(!client.is_authenticated());
	assert_eq!(client.status(), SessionStatus::Anonymous);

	refresh_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn bootstrap_without_cookie_reports_logged_out() {
	let server = MockServer::start_async().await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/").json_body(json!({}));
			then.status(401).json_body(json!({ "detail": "Refresh token missing" }));
		})
		.await;
	let (client, _) = common::new_client(&server);

	assert!(!client.bootstrap().await);
	assert!(client.access_token().is_none());
	assert_eq!(client.status(), SessionStatus::Anonymous);
	assert_eq!(client.refresh_metrics.failures(), 1);

	refresh_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn login_clears_marker_so_the_next_start_bootstraps() {
	let server = MockServer::start_async().await;
	let t1 = common::jwt("user-1", "t1");
	let t2 = common::jwt("user-1", "t2");

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200)
				.header("set-cookie", "refresh_token=rt-1; HttpOnly; Path=/api/token/refresh/")
				.json_body(json!({ "access": t1 }));
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/").header("cookie", "refresh_token=rt-1");
			then.status(200).json_body(json!({ "access": t2 }));
		})
		.await;
	let markers = MemoryMarkerStore::default();
	let browser = ReqwestHttpClient::default();

	markers.set(DEFAULT_MARKER_KEY, true);

	let first_run = common::client_for(&server, &markers, &browser);

	first_run.login_with("a@b.com", "pw").await.expect("Login should succeed.");

	assert!(!markers.get(DEFAULT_MARKER_KEY));

	let restarted = common::client_for(&server, &markers, &browser);

	assert!(!restarted.is_authenticated());
	assert!(restarted.bootstrap().await);

	let identity = restarted
		.identity()
		.expect("Refreshed token should decode.")
		.expect("Bootstrap should leave a token behind.");

	assert_eq!(identity.token_id.as_deref(), Some("t2"));
	assert_eq!(restarted.status(), SessionStatus::Authenticated);

	refresh_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn logout_then_restart_never_refreshes() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200)
				.header("set-cookie", "refresh_token=rt-1; HttpOnly; Path=/")
				.json_body(json!({ "access": common::jwt("user-1", "t1") }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/logout/");
			then.status(205);
		})
		.await;

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/");
			then.status(200).json_body(json!({ "access": common::jwt("user-1", "t2") }));
		})
		.await;
	let markers = MemoryMarkerStore::default();
	let browser = ReqwestHttpClient::default();
	let first_run = common::client_for(&server, &markers, &browser);

	first_run.login_with("a@b.com", "pw").await.expect("Login should succeed.");
	first_run.logout().await.expect("Logout should succeed.");

	let restarted = common::client_for(&server, &markers, &browser);

	assert!(!restarted.bootstrap().await);

	refresh_mock.assert_calls_async(0).await;
}
