//! Identity view decoded from an access token's JWT payload.
//!
//! The client never verifies signatures; the backend stays the authority on whether a token is
//! valid. Decoding only exposes "who is logged in" to the UI collaborator, and the identity
//! disappears together with the token it was read from.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Errors raised while decoding an access token payload.
#[derive(Debug, ThisError)]
pub enum IdentityError {
	/// Token is not made of three dot-separated segments.
	#[error("Access token is not a JWT: expected 3 segments, found {segments}.")]
	NotAJwt {
		/// Number of segments observed.
		segments: usize,
	},
	/// Payload segment is not valid base64url.
	#[error("Access token payload is not valid base64url.")]
	Base64(#[from] base64::DecodeError),
	/// Payload is not a JSON object.
	#[error("Access token payload is not a JSON object.")]
	Json(#[from] serde_json::Error),
	/// A timestamp claim is outside the supported range or not an integer.
	#[error("Claim `{claim}` is not a valid unix timestamp.")]
	InvalidTimestamp {
		/// Claim name (`exp` or `iat`).
		claim: &'static str,
	},
}

/// Logged-in identity derived from the current access token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
	/// Subject identifier (`sub`, or the backend's `user_id` claim).
	pub subject: Option<String>,
	/// Expiry instant from the `exp` claim.
	#[serde(with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Issued-at instant from the `iat` claim.
	#[serde(with = "time::serde::timestamp::option")]
	pub issued_at: Option<OffsetDateTime>,
	/// Token identifier from the `jti` claim.
	pub token_id: Option<String>,
	/// Every claim found in the payload, including the ones lifted into fields above.
	pub claims: Map<String, Value>,
}
impl Identity {
	/// Decodes the identity carried by an access token.
	pub fn from_access_token(token: &TokenSecret) -> Result<Self, IdentityError> {
		let segments = token.expose().split('.').collect::<Vec<_>>();

		if segments.len() != 3 {
			return Err(IdentityError::NotAJwt { segments: segments.len() });
		}

		let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
		let claims = serde_json::from_slice::<Map<String, Value>>(&payload)?;

		Self::from_claims(claims)
	}

	/// Builds an identity from an already-decoded claim map.
	pub fn from_claims(claims: Map<String, Value>) -> Result<Self, IdentityError> {
		let subject = ["sub", "user_id"].iter().find_map(|name| match claims.get(*name)? {
			Value::String(s) => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			_ => None,
		});
		let expires_at = timestamp_claim(&claims, "exp")?;
		let issued_at = timestamp_claim(&claims, "iat")?;
		let token_id = claims.get("jti").and_then(Value::as_str).map(str::to_owned);

		Ok(Self { subject, expires_at, issued_at, token_id, claims })
	}

	/// Returns a raw claim by name.
	pub fn claim(&self, name: &str) -> Option<&Value> {
		self.claims.get(name)
	}

	/// Returns `true` if the token carried an expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expiry| instant >= expiry)
	}

	/// Time left until expiry, clamped at zero; `None` when the token has no `exp` claim.
	pub fn expires_in(&self, now: OffsetDateTime) -> Option<Duration> {
		self.expires_at.map(|expiry| {
			let remaining = expiry - now;

			if remaining.is_negative() { Duration::ZERO } else { remaining }
		})
	}
}

fn timestamp_claim(
	claims: &Map<String, Value>,
	claim: &'static str,
) -> Result<Option<OffsetDateTime>, IdentityError> {
	let Some(value) = claims.get(claim) else {
		return Ok(None);
	};
	let seconds = value.as_i64().ok_or(IdentityError::InvalidTimestamp { claim })?;

	OffsetDateTime::from_unix_timestamp(seconds)
		.map(Some)
		.map_err(|_| IdentityError::InvalidTimestamp { claim })
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn jwt(payload: Value) -> TokenSecret {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
		let body = URL_SAFE_NO_PAD.encode(payload.to_string());

		TokenSecret::new(format!("{header}.{body}.signature"))
	}

	#[test]
	fn decodes_backend_claims() {
		let token = jwt(serde_json::json!({
			"token_type": "access",
			"exp": 1_735_693_200,
			"iat": 1_735_689_600,
			"jti": "a1b2",
			"user_id": 42,
		}));
		let identity =
			Identity::from_access_token(&token).expect("Backend token fixture should decode.");

		assert_eq!(identity.subject.as_deref(), Some("42"));
		assert_eq!(identity.token_id.as_deref(), Some("a1b2"));
		assert_eq!(identity.issued_at, Some(macros::datetime!(2025-01-01 00:00 UTC)));
		assert_eq!(identity.expires_at, Some(macros::datetime!(2025-01-01 01:00 UTC)));
		assert_eq!(identity.claim("token_type"), Some(&Value::from("access")));
		assert!(!identity.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(identity.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert_eq!(
			identity.expires_in(macros::datetime!(2025-01-01 00:30 UTC)),
			Some(Duration::minutes(30)),
		);
		assert_eq!(identity.expires_in(macros::datetime!(2025-01-02 00:00 UTC)), Some(Duration::ZERO));
	}

	#[test]
	fn prefers_sub_over_user_id() {
		let token = jwt(serde_json::json!({ "sub": "user-7", "user_id": 7 }));
		let identity = Identity::from_access_token(&token).expect("Token fixture should decode.");

		assert_eq!(identity.subject.as_deref(), Some("user-7"));
		assert_eq!(identity.expires_at, None);
		assert_eq!(identity.expires_in(OffsetDateTime::now_utc()), None);
	}

	#[test]
	fn tolerates_padded_payload_segments() {
		let token = jwt(serde_json::json!({ "sub": "x" }));
		let mut parts = token.expose().split('.').map(str::to_owned).collect::<Vec<_>>();

		parts[1].push_str("==");

		let padded = TokenSecret::new(parts.join("."));

		assert!(Identity::from_access_token(&padded).is_ok());
	}

	#[test]
	fn rejects_malformed_tokens() {
		assert!(matches!(
			Identity::from_access_token(&TokenSecret::new("opaque-token")),
			Err(IdentityError::NotAJwt { segments: 1 })
		));
		assert!(matches!(
			Identity::from_access_token(&TokenSecret::new("a.@@@.c")),
			Err(IdentityError::Base64(_))
		));

		let not_object = format!("a.{}.c", URL_SAFE_NO_PAD.encode("[1,2]"));

		assert!(matches!(
			Identity::from_access_token(&TokenSecret::new(not_object)),
			Err(IdentityError::Json(_))
		));
		assert!(matches!(
			Identity::from_access_token(&jwt(serde_json::json!({ "exp": "tomorrow" }))),
			Err(IdentityError::InvalidTimestamp { claim: "exp" })
		));
	}
}
