//! Auth-domain secrets, login credentials, and identities derived from access tokens.

pub mod credentials;
pub mod identity;
pub mod secret;

pub use credentials::*;
pub use identity::*;
pub use secret::*;
