//! Construction-time configuration: credentials plus transport settings.
//!
//! The shape is format-agnostic; any serde deserializer (YAML, JSON, TOML)
//! can feed [`ClientConfig`] from an existing credential map.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Secret},
};

/// Default v1.1 API base URL. The trailing slash is significant because
/// endpoint names are appended verbatim.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com/1.1/";
/// Default OAuth 2 token-exchange endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.twitter.com/oauth2/token/";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Deserializable client settings. Unknown keys are rejected, matching the
/// strictness of the original configuration tree.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
	/// OAuth consumer key (required, non-empty).
	pub consumer_key: String,
	/// OAuth consumer secret (required, non-empty).
	pub consumer_secret: Secret,
	/// Optional user access token; pair it with `access_token_secret`.
	#[serde(default)]
	pub access_token: Option<String>,
	/// Optional user access token secret.
	#[serde(default)]
	pub access_token_secret: Option<Secret>,
	/// API base URL endpoint names are appended to.
	#[serde(default = "default_api_url")]
	pub api_url: String,
	/// Token-exchange endpoint URL for the app-only bearer flow.
	#[serde(default = "default_token_url")]
	pub token_url: String,
	/// Optional proxy URL handed to the HTTP client.
	#[serde(default)]
	pub proxy: Option<String>,
	/// Request timeout in seconds.
	#[serde(default = "default_timeout")]
	pub timeout: u64,
	/// Whether to verify the peer TLS certificate.
	#[serde(default = "default_verify_peer")]
	pub verify_peer: bool,
}
impl ClientConfig {
	/// Extracts the immutable credentials handed to the client.
	pub fn credentials(&self) -> Credentials {
		Credentials {
			consumer_key: self.consumer_key.clone(),
			consumer_secret: self.consumer_secret.clone(),
			access_token: self.access_token.clone(),
			access_token_secret: self.access_token_secret.clone(),
		}
	}

	/// Extracts the transport-level settings.
	pub fn http(&self) -> HttpConfig {
		HttpConfig { proxy: self.proxy.clone(), timeout: self.timeout, verify_peer: self.verify_peer }
	}
}

/// Transport-level settings consumed when the crate builds its own HTTP client.
#[derive(Clone, Debug)]
pub struct HttpConfig {
	/// Optional proxy URL.
	pub proxy: Option<String>,
	/// Request timeout in seconds.
	pub timeout: u64,
	/// Whether to verify the peer TLS certificate.
	pub verify_peer: bool,
}
impl Default for HttpConfig {
	fn default() -> Self {
		Self { proxy: None, timeout: DEFAULT_TIMEOUT_SECS, verify_peer: true }
	}
}

fn default_api_url() -> String {
	DEFAULT_API_URL.into()
}

fn default_token_url() -> String {
	DEFAULT_TOKEN_URL.into()
}

fn default_timeout() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

fn default_verify_peer() -> bool {
	true
}
