//! The Twitter v1.1 client: authorization selection, bearer token exchange, and
//! query dispatch over an injected transport.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, Credentials},
	config::{DEFAULT_API_URL, DEFAULT_TOKEN_URL},
	error::ConfigError,
	http::{Header, Method, Response, Transport},
	obs::{RequestKind, RequestSpan},
	signer::{self, Clock, NonceSource, RandomNonce, SystemClock},
};
#[cfg(feature = "reqwest")]
use crate::{config::ClientConfig, http::ReqwestTransport};

const GRANT_TYPE_BODY: &str = "grant_type=client_credentials";

/// Twitter REST v1.1 client, generic over the HTTP transport.
///
/// The client owns the immutable credentials plus the injected transport,
/// clock, and nonce capabilities; it keeps no other state, so no signature or
/// bearer token is ever cached across calls. Callers wanting to avoid repeated
/// token exchanges cache the header returned by [`Twitter::bearer_header`]
/// themselves.
pub struct Twitter<T>
where
	T: ?Sized + Transport,
{
	credentials: Credentials,
	api_url: Url,
	token_url: Url,
	transport: Arc<T>,
	clock: Arc<dyn Clock>,
	nonce_source: Arc<dyn NonceSource>,
}
impl<T> Twitter<T>
where
	T: ?Sized + Transport,
{
	/// Creates a client around a caller-provided transport, using the public
	/// Twitter endpoints, the system clock, and a random nonce source.
	pub fn with_transport(credentials: Credentials, transport: impl Into<Arc<T>>) -> Self {
		Self {
			credentials,
			api_url: default_url(DEFAULT_API_URL),
			token_url: default_url(DEFAULT_TOKEN_URL),
			transport: transport.into(),
			clock: Arc::new(SystemClock),
			nonce_source: Arc::new(RandomNonce),
		}
	}

	/// Replaces the API base URL endpoint names are appended to.
	pub fn with_api_url(mut self, api_url: Url) -> Self {
		self.api_url = api_url;

		self
	}

	/// Replaces the token-exchange endpoint used by the bearer flow.
	pub fn with_token_url(mut self, token_url: Url) -> Self {
		self.token_url = token_url;

		self
	}

	/// Replaces the clock consulted for `oauth_timestamp`.
	pub fn with_clock(mut self, clock: impl 'static + Clock) -> Self {
		self.clock = Arc::new(clock);

		self
	}

	/// Replaces the nonce source consulted for `oauth_nonce`.
	pub fn with_nonce_source(mut self, nonce_source: impl 'static + NonceSource) -> Self {
		self.nonce_source = Arc::new(nonce_source);

		self
	}

	/// Renders the HTTP Basic header used for the bearer token exchange.
	///
	/// Fails with [`Error::InvalidParameters`] when the consumer key or secret
	/// is missing, enumerating the empty fields.
	pub fn basic_header(&self) -> Result<String> {
		let missing = self.missing_consumer_fields();

		if !missing.is_empty() {
			return Err(Error::InvalidParameters { missing });
		}

		Ok(signer::basic_header(
			&self.credentials.consumer_key,
			self.credentials.consumer_secret.expose(),
		))
	}

	/// Computes the OAuth 1.0a `Authorization` header for a request.
	///
	/// `base_url` must be the query-less target URL. Fails with
	/// [`Error::InvalidParameters`] before signing when any of the four
	/// credential fields is missing or empty.
	pub fn oauth_header(
		&self,
		base_url: &str,
		method: Method,
		params: &BTreeMap<String, String>,
	) -> Result<String> {
		let mut missing = self.missing_consumer_fields();
		let token = self.credentials.access_token.as_deref().unwrap_or("");
		let token_secret =
			self.credentials.access_token_secret.as_ref().map(|s| s.expose()).unwrap_or("");

		if token.is_empty() {
			missing.push("access_token");
		}
		if token_secret.is_empty() {
			missing.push("access_token_secret");
		}
		if !missing.is_empty() {
			return Err(Error::InvalidParameters { missing });
		}

		Ok(signer::oauth1_header(
			&self.credentials.consumer_key,
			self.credentials.consumer_secret.expose(),
			token,
			token_secret,
			method,
			base_url,
			params,
			self.clock.unix_timestamp(),
			&self.nonce_source.nonce(),
		))
	}

	/// Exchanges the consumer credentials for an app-only bearer header.
	///
	/// Posts `grant_type=client_credentials` to the token endpoint under Basic
	/// auth and returns `Bearer <access_token>`. The token is not cached.
	pub async fn bearer_header(&self) -> Result<String> {
		let span = RequestSpan::new(RequestKind::TokenExchange, "bearer_header");

		span.instrument(async move {
			let basic = self.basic_header()?;
			let headers = [authorization(basic), form_content_type()];
			let response = self.transport.post(&self.token_url, &headers, GRANT_TYPE_BODY).await?;
			let token: BearerToken = decode(response.content())?;

			if token.token_type != "bearer" {
				return Err(Error::InvalidTokenType { token_type: token.token_type });
			}

			Ok(format!("Bearer {}", token.access_token))
		})
		.await
	}

	/// Selects the authorization header for a request: OAuth 1.0a user-context
	/// signing when a full user token pair is present, the app-only bearer flow
	/// otherwise. Pure dispatch, no caching.
	pub async fn authorization(
		&self,
		base_url: &str,
		method: Method,
		params: &BTreeMap<String, String>,
	) -> Result<String> {
		if self.credentials.user_token().is_some() {
			self.oauth_header(base_url, method, params)
		} else {
			self.bearer_header().await
		}
	}

	/// Performs a query against the API, returning the raw transport response.
	///
	/// The target is `api_url + name + "." + format`; the authorization header
	/// is computed over that query-less base URL, and the canonical query
	/// string is appended afterwards when `params` is non-empty. POST requests
	/// carry an empty body, with parameters riding the query string.
	pub async fn query(
		&self,
		name: &str,
		method: Method,
		format: &str,
		params: &BTreeMap<String, String>,
	) -> Result<Response> {
		let span = RequestSpan::new(RequestKind::Query, "query");

		span.instrument(async move {
			let base_url = format!("{}{name}.{format}", self.api_url);
			let auth = self.authorization(&base_url, method, params).await?;
			let query = signer::query_parameters(params);
			let target = if query.is_empty() { base_url } else { format!("{base_url}?{query}") };
			let url = Url::parse(&target)
				.map_err(|source| ConfigError::InvalidUrl { field: "endpoint", source })?;
			let headers = [authorization(auth), form_content_type()];

			match method {
				Method::Get => Ok(self.transport.get(&url, &headers).await?),
				Method::Post => Ok(self.transport.post(&url, &headers, "").await?),
			}
		})
		.await
	}

	/// Returns the user timeline as decoded JSON.
	pub async fn timeline(&self, params: &BTreeMap<String, String>) -> Result<serde_json::Value> {
		let response = self.query("statuses/user_timeline", Method::Get, "json", params).await?;

		decode(response.content())
	}

	/// Posts a status update, returning the created tweet as decoded JSON.
	pub async fn update_status(
		&self,
		status: &str,
		params: &BTreeMap<String, String>,
	) -> Result<serde_json::Value> {
		let mut params = params.clone();

		params.insert("status".into(), status.into());

		let response = self.query("statuses/update", Method::Post, "json", &params).await?;

		decode(response.content())
	}

	fn missing_consumer_fields(&self) -> Vec<&'static str> {
		let mut missing = Vec::new();

		if self.credentials.consumer_key.is_empty() {
			missing.push("consumer_key");
		}
		if self.credentials.consumer_secret.is_empty() {
			missing.push("consumer_secret");
		}

		missing
	}
}
#[cfg(feature = "reqwest")]
impl Twitter<ReqwestTransport> {
	/// Creates a client with a default reqwest transport.
	pub fn new(credentials: Credentials) -> Self {
		Self::with_transport(credentials, ReqwestTransport::default())
	}

	/// Builds a fully configured client (credentials, endpoints, transport)
	/// from deserialized settings.
	pub fn from_config(config: &ClientConfig) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config.http())?;
		let api_url = Url::parse(&config.api_url)
			.map_err(|source| ConfigError::InvalidUrl { field: "api_url", source })?;
		let token_url = Url::parse(&config.token_url)
			.map_err(|source| ConfigError::InvalidUrl { field: "token_url", source })?;

		Ok(Self::with_transport(config.credentials(), transport)
			.with_api_url(api_url)
			.with_token_url(token_url))
	}
}
impl<T> Clone for Twitter<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			credentials: self.credentials.clone(),
			api_url: self.api_url.clone(),
			token_url: self.token_url.clone(),
			transport: Arc::clone(&self.transport),
			clock: Arc::clone(&self.clock),
			nonce_source: Arc::clone(&self.nonce_source),
		}
	}
}
impl<T> Debug for Twitter<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Twitter")
			.field("api_url", &self.api_url.as_str())
			.field("token_url", &self.token_url.as_str())
			.field("consumer_key", &self.credentials.consumer_key)
			.field("user_token_set", &self.credentials.user_token().is_some())
			.finish()
	}
}

fn authorization(value: String) -> Header {
	("authorization", value)
}

fn form_content_type() -> Header {
	("content-type", "application/x-www-form-urlencoded".into())
}

fn decode<D>(body: &str) -> Result<D>
where
	D: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::InvalidResponse { body: body.to_owned(), source })
}

fn default_url(raw: &'static str) -> Url {
	// Parsing a vetted constant cannot fail.
	Url::parse(raw).expect("default URL constant must parse")
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::Mutex;
	// self
	use super::*;
	use crate::{
		http::TransportFuture,
		signer::{FixedClock, FixedNonce},
	};

	const BEARER_BODY: &str =
		"{\"token_type\":\"bearer\",\"access_token\":\"cc4f26cc4a3f61a84436014b2166e431\"}";
	const EXPECTED_BEARER_HEADER: &str = "Bearer cc4f26cc4a3f61a84436014b2166e431";
	const EXPECTED_BASIC_HEADER: &str = "Basic Zm9vOmJhcg==";

	struct RecordedRequest {
		method: &'static str,
		url: String,
		headers: Vec<(String, String)>,
		body: String,
	}

	#[derive(Default)]
	struct MockTransport {
		responses: Mutex<Vec<Response>>,
		requests: Mutex<Vec<RecordedRequest>>,
	}
	impl MockTransport {
		fn respond_with(bodies: &[(u16, &str)]) -> Self {
			let responses = bodies
				.iter()
				.rev()
				.map(|&(status, body)| Response { status, body: body.into() })
				.collect();

			Self { responses: Mutex::new(responses), requests: Default::default() }
		}

		fn record(&self, method: &'static str, url: &Url, headers: &[Header], body: &str) {
			self.requests.lock().expect("Request log should not be poisoned.").push(
				RecordedRequest {
					method,
					url: url.to_string(),
					headers: headers.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
					body: body.into(),
				},
			);
		}

		fn next_response(&self) -> Response {
			self.responses
				.lock()
				.expect("Response queue should not be poisoned.")
				.pop()
				.expect("Mock transport should have a canned response left.")
		}

		fn requests(&self) -> Vec<RecordedRequest> {
			std::mem::take(&mut *self.requests.lock().expect("Request log should not be poisoned."))
		}
	}
	impl Transport for MockTransport {
		fn get<'a>(&'a self, url: &'a Url, headers: &'a [Header]) -> TransportFuture<'a> {
			Box::pin(async move {
				self.record("GET", url, headers, "");

				Ok(self.next_response())
			})
		}

		fn post<'a>(
			&'a self,
			url: &'a Url,
			headers: &'a [Header],
			body: &'a str,
		) -> TransportFuture<'a> {
			Box::pin(async move {
				self.record("POST", url, headers, body);

				Ok(self.next_response())
			})
		}
	}

	fn header<'r>(request: &'r RecordedRequest, name: &str) -> &'r str {
		request
			.headers
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
			.expect("Recorded request should carry the header.")
	}

	fn app_only_client(transport: MockTransport) -> (Twitter<MockTransport>, Arc<MockTransport>) {
		let transport = Arc::new(transport);
		let client = Twitter::with_transport(Credentials::app_only("foo", "bar"), transport.clone());

		(client, transport)
	}

	fn user_context_client(
		transport: MockTransport,
	) -> (Twitter<MockTransport>, Arc<MockTransport>) {
		let transport = Arc::new(transport);
		let client = Twitter::with_transport(
			Credentials::user_context("foo", "bar", "baz", "test"),
			transport.clone(),
		)
		.with_clock(FixedClock(1_234_567_890))
		.with_nonce_source(FixedNonce("1234567890".into()));

		(client, transport)
	}

	#[test]
	fn basic_header_matches_reference_vector() {
		let (client, _) = app_only_client(MockTransport::default());

		assert_eq!(
			client.basic_header().expect("Basic header should render."),
			EXPECTED_BASIC_HEADER,
		);
	}

	#[test]
	fn basic_header_enumerates_missing_fields() {
		let client =
			Twitter::<MockTransport>::with_transport(Credentials::app_only("", ""), MockTransport::default());
		let err = client.basic_header().expect_err("Empty credentials should be rejected.");

		assert!(matches!(
			err,
			Error::InvalidParameters { ref missing }
				if missing == &["consumer_key", "consumer_secret"],
		));
	}

	#[test]
	fn oauth_header_signs_with_injected_clock_and_nonce() {
		let (client, _) = user_context_client(MockTransport::default());
		let params = BTreeMap::new();
		let first = client
			.oauth_header("https://domain.tld/", Method::Get, &params)
			.expect("OAuth header should render.");
		let second = client
			.oauth_header("https://domain.tld/", Method::Get, &params)
			.expect("OAuth header should render.");

		assert!(first.starts_with(
			"OAuth oauth_consumer_key=foo, oauth_nonce=1234567890, \
			 oauth_signature_method=HMAC-SHA1, oauth_timestamp=1234567890, oauth_token=baz, \
			 oauth_version=1.0, oauth_signature=",
		));
		// Fixed clock + nonce make the signature reproducible.
		assert_eq!(first, second);
	}

	#[test]
	fn oauth_header_enumerates_missing_token_fields() {
		let (client, _) = app_only_client(MockTransport::default());
		let err = client
			.oauth_header("https://domain.tld/", Method::Get, &BTreeMap::new())
			.expect_err("App-only credentials cannot sign user-context requests.");

		assert!(matches!(
			err,
			Error::InvalidParameters { ref missing }
				if missing == &["access_token", "access_token_secret"],
		));
	}

	#[tokio::test]
	async fn bearer_header_exchanges_client_credentials() {
		let (client, transport) = app_only_client(MockTransport::respond_with(&[(200, BEARER_BODY)]));
		let bearer =
			client.bearer_header().await.expect("Bearer token exchange should succeed.");

		assert_eq!(bearer, EXPECTED_BEARER_HEADER);

		let requests = transport.requests();

		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0].method, "POST");
		assert_eq!(requests[0].url, DEFAULT_TOKEN_URL);
		assert_eq!(requests[0].body, GRANT_TYPE_BODY);
		assert_eq!(header(&requests[0], "authorization"), EXPECTED_BASIC_HEADER);
		assert_eq!(header(&requests[0], "content-type"), "application/x-www-form-urlencoded");
	}

	#[tokio::test]
	async fn bearer_header_rejects_bodies_without_token_fields() {
		let (client, _) = app_only_client(MockTransport::respond_with(&[(200, "{}")]));
		let err = client
			.bearer_header()
			.await
			.expect_err("A body without token fields should be rejected.");

		assert!(matches!(err, Error::InvalidResponse { ref body, .. } if body == "{}"));
	}

	#[tokio::test]
	async fn bearer_header_rejects_non_bearer_token_types() {
		let (client, _) = app_only_client(MockTransport::respond_with(&[(
			200,
			"{\"token_type\":\"something_wrong\",\"access_token\":\"cc4f26cc4a3f61a84436014b2166e431\"}",
		)]));
		let err =
			client.bearer_header().await.expect_err("Non-bearer token types should be rejected.");

		assert!(matches!(
			err,
			Error::InvalidTokenType { ref token_type } if token_type == "something_wrong",
		));
	}

	#[tokio::test]
	async fn authorization_prefers_user_context_signing() {
		let (client, transport) = user_context_client(MockTransport::default());
		let auth = client
			.authorization("https://domain.tld/", Method::Get, &BTreeMap::new())
			.await
			.expect("Authorization selection should succeed.");

		assert!(auth.starts_with("OAuth "));
		assert!(auth.contains("oauth_signature="));
		// The OAuth path never touches the network.
		assert!(transport.requests().is_empty());
	}

	#[tokio::test]
	async fn authorization_falls_back_to_bearer_flow() {
		let (client, transport) = app_only_client(MockTransport::respond_with(&[(200, BEARER_BODY)]));
		let auth = client
			.authorization("https://domain.tld/", Method::Get, &BTreeMap::new())
			.await
			.expect("Authorization selection should succeed.");

		assert_eq!(auth, EXPECTED_BEARER_HEADER);
		assert_eq!(transport.requests().len(), 1);
	}

	#[tokio::test]
	async fn query_signs_base_url_and_appends_query_string() {
		let (client, transport) = user_context_client(MockTransport::respond_with(&[(200, "[]")]));
		let params: BTreeMap<String, String> = [
			("count".to_string(), "10".to_string()),
			("screen_name".to_string(), "rustlang".to_string()),
		]
		.into();
		let response = client
			.query("statuses/user_timeline", Method::Get, "json", &params)
			.await
			.expect("Query dispatch should succeed.");

		assert_eq!(response.status, 200);

		let requests = transport.requests();

		assert_eq!(requests.len(), 1);
		assert_eq!(requests[0].method, "GET");
		assert_eq!(
			requests[0].url,
			"https://api.twitter.com/1.1/statuses/user_timeline.json?count=10&screen_name=rustlang",
		);
		assert!(header(&requests[0], "authorization").starts_with("OAuth "));
	}

	#[tokio::test]
	async fn query_without_parameters_omits_the_query_string() {
		let (client, transport) = user_context_client(MockTransport::respond_with(&[(200, "{}")]));

		client
			.query("account/verify_credentials", Method::Get, "json", &BTreeMap::new())
			.await
			.expect("Query dispatch should succeed.");

		let requests = transport.requests();

		assert_eq!(
			requests[0].url,
			"https://api.twitter.com/1.1/account/verify_credentials.json",
		);
	}

	#[tokio::test]
	async fn query_propagates_non_2xx_responses_unchanged() {
		let (client, _) = user_context_client(MockTransport::respond_with(&[(
			500,
			"{\"errors\":[{\"code\":131}]}",
		)]));
		let response = client
			.query("statuses/user_timeline", Method::Get, "json", &BTreeMap::new())
			.await
			.expect("Non-2xx statuses should pass through, not error.");

		assert_eq!(response.status, 500);
		assert!(!response.is_success());
		assert_eq!(response.content(), "{\"errors\":[{\"code\":131}]}");
	}

	#[tokio::test]
	async fn timeline_decodes_the_response_body() {
		let (client, _) = user_context_client(MockTransport::respond_with(&[(
			200,
			"[{\"id\":1,\"text\":\"hello\"}]",
		)]));
		let timeline = client
			.timeline(&BTreeMap::new())
			.await
			.expect("Timeline query should decode successfully.");

		assert_eq!(timeline[0]["text"], "hello");
	}

	#[tokio::test]
	async fn timeline_surfaces_undecodable_bodies() {
		let (client, _) =
			user_context_client(MockTransport::respond_with(&[(200, "<html>not json</html>")]));
		let err = client
			.timeline(&BTreeMap::new())
			.await
			.expect_err("Non-JSON bodies should surface as invalid responses.");

		assert!(matches!(
			err,
			Error::InvalidResponse { ref body, .. } if body == "<html>not json</html>",
		));
	}

	#[tokio::test]
	async fn update_status_posts_with_the_status_parameter() {
		let (client, transport) = user_context_client(MockTransport::respond_with(&[(
			200,
			"{\"id\":7,\"text\":\"hello world\"}",
		)]));
		let tweet = client
			.update_status("hello world", &BTreeMap::new())
			.await
			.expect("Status update should succeed.");

		assert_eq!(tweet["id"], 7);

		let requests = transport.requests();

		assert_eq!(requests[0].method, "POST");
		assert_eq!(
			requests[0].url,
			"https://api.twitter.com/1.1/statuses/update.json?status=hello%20world",
		);
		// Parameters ride the query string; the POST body stays empty.
		assert_eq!(requests[0].body, "");
	}
}
