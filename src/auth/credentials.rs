//! Email + password credentials submitted to the token endpoint.

// self
use crate::_prelude::*;

/// Login credentials; the password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
	/// Account email address.
	pub email: String,
	password: String,
}
impl Credentials {
	/// Creates credentials for the provided email and password.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}

	/// Returns the password. Callers must avoid logging this string.
	pub fn expose_password(&self) -> &str {
		&self.password
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn serializes_the_token_endpoint_body() {
		let credentials = Credentials::new("a@b.com", "pw");
		let body = serde_json::to_value(&credentials).expect("Credentials should serialize.");

		assert_eq!(body, serde_json::json!({ "email": "a@b.com", "password": "pw" }));
	}

	#[test]
	fn debug_redacts_password() {
		let rendered = format!("{:?}", Credentials::new("a@b.com", "hunter2"));

		assert!(rendered.contains("a@b.com"));
		assert!(!rendered.contains("hunter2"));
	}
}
