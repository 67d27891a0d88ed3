//! Credential material for user-context and app-only authorization.

// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping credential material out of logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the wrapped value is the empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.into())
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Application credentials, immutable once the client is constructed.
///
/// The consumer pair is always required; the access token pair is only needed
/// for OAuth 1.0a user-context signing and is treated as absent unless both
/// parts are present and non-empty.
#[derive(Clone, Debug)]
pub struct Credentials {
	/// OAuth consumer key identifying the application.
	pub consumer_key: String,
	/// OAuth consumer secret.
	pub consumer_secret: Secret,
	/// User access token for user-context signing.
	pub access_token: Option<String>,
	/// User access token secret paired with `access_token`.
	pub access_token_secret: Option<Secret>,
}
impl Credentials {
	/// Credentials for the app-only bearer flow.
	pub fn app_only(consumer_key: impl Into<String>, consumer_secret: impl Into<Secret>) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			access_token: None,
			access_token_secret: None,
		}
	}

	/// Credentials carrying a user token pair for OAuth 1.0a signing.
	pub fn user_context(
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<Secret>,
		access_token: impl Into<String>,
		access_token_secret: impl Into<Secret>,
	) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			access_token: Some(access_token.into()),
			access_token_secret: Some(access_token_secret.into()),
		}
	}

	/// Returns the user token pair when both parts are present and non-empty.
	pub fn user_token(&self) -> Option<(&str, &str)> {
		match (self.access_token.as_deref(), self.access_token_secret.as_ref()) {
			(Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() =>
				Some((token, secret.expose())),
			_ => None,
		}
	}
}

/// Token endpoint response for the client-credentials exchange.
#[derive(Clone, Debug, Deserialize)]
pub struct BearerToken {
	/// Token type reported by the endpoint; must be exactly `bearer`.
	pub token_type: String,
	/// Opaque bearer token value.
	pub access_token: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = Secret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "Secret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn user_token_requires_both_parts_non_empty() {
		assert_eq!(
			Credentials::user_context("foo", "bar", "baz", "test").user_token(),
			Some(("baz", "test")),
		);
		assert_eq!(Credentials::app_only("foo", "bar").user_token(), None);
		assert_eq!(Credentials::user_context("foo", "bar", "", "test").user_token(), None);
		assert_eq!(Credentials::user_context("foo", "bar", "baz", "").user_token(), None);

		let partial = Credentials {
			consumer_key: "foo".into(),
			consumer_secret: "bar".into(),
			access_token: Some("baz".into()),
			access_token_secret: None,
		};

		assert_eq!(partial.user_token(), None);
	}
}
