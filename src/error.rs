//! Client-level error types shared across signing, token exchange, and transport.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// The three credential/token variants indicate a caller configuration bug or an
/// unexpected API contract change; none of them is retryable. Transport failures
/// pass through unchanged because the client never interprets HTTP status codes.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem raised at construction time.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Required credential fields are missing or empty for the attempted
	/// authorization flow; raised before any network call.
	#[error("Missing required credentials: {}.", .missing.join(", "))]
	InvalidParameters {
		/// Names of the credential fields that are absent or empty.
		missing: Vec<&'static str>,
	},
	/// Token endpoint body was not a JSON object carrying the expected fields.
	#[error("Token endpoint returned an unusable response: {body}")]
	InvalidResponse {
		/// Raw response body, kept verbatim for diagnosis.
		body: String,
		/// Structured decoding failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token exchange succeeded but returned a non-bearer token type.
	#[error("Token endpoint returned token type `{token_type}`, expected `bearer`.")]
	InvalidTokenType {
		/// Token type string received from the endpoint.
		token_type: String,
	},
	/// Transport failure (DNS, TCP, TLS); propagated unchanged.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured or derived URL cannot be parsed.
	#[error("The `{field}` URL is invalid.")]
	InvalidUrl {
		/// Name of the offending setting or request component.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while performing the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while performing the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
