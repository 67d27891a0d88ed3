//! OAuth 1.0a signing primitives: parameter canonicalization, HMAC-SHA1 signature
//! computation, and header assembly.
//!
//! Everything here is a pure function over its inputs so signatures stay
//! reproducible in tests; the clock and nonce enter through the [`Clock`] and
//! [`NonceSource`] capabilities instead of being read inline.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
// self
use crate::{_prelude::*, http::Method};

type HmacSha1 = Hmac<Sha1>;

// RFC 3986 section 2.3: ALPHA, DIGIT, '-', '.', '_', '~' stay unencoded, every
// other octet is percent-encoded with uppercase hex digits.
const UNRESERVED: &AsciiSet =
	&percent_encoding::NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Percent-encodes a string per RFC 3986 raw-url-encoding rules (space becomes
/// `%20`, never `+`).
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Renders `key=enc(value)` pairs joined by `&`, in map (lexicographic) order.
///
/// Keys are emitted as-is; only values are encoded. An empty map yields the
/// empty string.
pub fn query_parameters(params: &BTreeMap<String, String>) -> String {
	params.iter().map(|(k, v)| format!("{k}={}", percent_encode(v))).collect::<Vec<_>>().join("&")
}

/// Builds the signature base string `UPPER(method)&enc(base_url)&enc(params)`.
///
/// `base_url` must carry scheme, host, and path but no query string.
pub fn signature_base_string(method: Method, base_url: &str, parameter_string: &str) -> String {
	format!("{}&{}&{}", method.as_str(), percent_encode(base_url), percent_encode(parameter_string))
}

/// Builds the signing key `enc(consumer_secret)&enc(token_secret)`.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
	format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret))
}

/// Computes `base64(HMAC-SHA1(message, key))`.
pub fn hmac_sha1(key: &str, message: &str) -> String {
	// HMAC accepts keys of any length, so this cannot fail.
	let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC key of any length");

	mac.update(message.as_bytes());

	STANDARD.encode(mac.finalize().into_bytes())
}

/// Assembles the complete OAuth 1.0a `Authorization` header value.
///
/// Request parameters are merged first and the oauth parameters overwrite them
/// on key collision; the merged set, sorted by key, feeds both the canonical
/// parameter string and the rendered header pairs. The header keeps the
/// reference wire shape: unquoted `key=enc(value)` pairs joined by `", "` with
/// the encoded signature appended last.
#[allow(clippy::too_many_arguments)]
pub fn oauth1_header(
	consumer_key: &str,
	consumer_secret: &str,
	token: &str,
	token_secret: &str,
	method: Method,
	base_url: &str,
	params: &BTreeMap<String, String>,
	timestamp: i64,
	nonce: &str,
) -> String {
	let mut merged = params.clone();

	merged.insert("oauth_consumer_key".into(), consumer_key.into());
	merged.insert("oauth_nonce".into(), nonce.into());
	merged.insert("oauth_signature_method".into(), SIGNATURE_METHOD.into());
	merged.insert("oauth_timestamp".into(), timestamp.to_string());
	merged.insert("oauth_token".into(), token.into());
	merged.insert("oauth_version".into(), OAUTH_VERSION.into());

	let parameter_string = query_parameters(&merged);
	let base = signature_base_string(method, base_url, &parameter_string);
	let key = signing_key(consumer_secret, token_secret);
	let signature = hmac_sha1(&key, &base);
	let pairs =
		merged.iter().map(|(k, v)| format!("{k}={}", percent_encode(v))).collect::<Vec<_>>();

	format!("OAuth {}, oauth_signature={}", pairs.join(", "), percent_encode(&signature))
}

/// Renders the HTTP Basic header used for the bearer token exchange.
pub fn basic_header(consumer_key: &str, consumer_secret: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{consumer_key}:{consumer_secret}")))
}

/// Time source consulted for `oauth_timestamp`.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Current Unix timestamp in seconds.
	fn unix_timestamp(&self) -> i64;
}

/// System wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn unix_timestamp(&self) -> i64 {
		time::OffsetDateTime::now_utc().unix_timestamp()
	}
}

/// Fixed clock yielding deterministic signatures in tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);
impl Clock for FixedClock {
	fn unix_timestamp(&self) -> i64 {
		self.0
	}
}

/// Per-request nonce generator feeding `oauth_nonce`.
pub trait NonceSource
where
	Self: Send + Sync,
{
	/// Produces a fresh nonce; the value must be unique per request.
	fn nonce(&self) -> String;
}

/// 32-character alphanumeric nonce drawn from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNonce;
impl NonceSource for RandomNonce {
	fn nonce(&self) -> String {
		rand::rng().sample_iter(Alphanumeric).take(32).map(char::from).collect()
	}
}

/// Fixed nonce yielding deterministic signatures in tests.
#[derive(Clone, Debug)]
pub struct FixedNonce(pub String);
impl NonceSource for FixedNonce {
	fn nonce(&self) -> String {
		self.0.clone()
	}
}
