//! Transport contract between the client and an HTTP stack.
//!
//! The client depends only on [`Transport`]: one GET, one POST, and a
//! [`Response`] exposing the body text plus the raw status code. The
//! reqwest-backed [`ReqwestTransport`] behind the `reqwest` feature is the
//! default stack, but any implementation can be injected, which is also how the
//! unit tests drive the client without a network.

// std
#[cfg(feature = "reqwest")] use std::time::Duration;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::{config::HttpConfig, error::ConfigError};

/// HTTP method used by the v1.1 API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// HTTP GET; parameters ride the query string.
	Get,
	/// HTTP POST.
	Post,
}
impl Method {
	/// Uppercase method name, as used in the signature base string.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request header as a static name plus rendered value.
pub type Header = (&'static str, String);

/// Boxed future returned by [`Transport`] methods.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Response, TransportError>> + 'a + Send>>;

/// Minimal response surface the client consumes.
#[derive(Clone, Debug)]
pub struct Response {
	/// HTTP status code, left uninterpreted by the client.
	pub status: u16,
	/// Response body decoded as UTF-8 text.
	pub body: String,
}
impl Response {
	/// Returns the response body text.
	pub fn content(&self) -> &str {
		&self.body
	}

	/// Whether the status code is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// HTTP stack contract implemented by injected transports.
///
/// Implementations must be safe for concurrent use; the client adds no locking
/// of its own. Timeouts and proxying are transport concerns, not client ones.
pub trait Transport
where
	Self: Send + Sync,
{
	/// Issues a GET against `url` with the provided headers.
	fn get<'a>(&'a self, url: &'a Url, headers: &'a [Header]) -> TransportFuture<'a>;

	/// Issues a POST against `url` with the provided headers and literal body.
	fn post<'a>(&'a self, url: &'a Url, headers: &'a [Header], body: &'a str)
	-> TransportFuture<'a>;
}

#[cfg(feature = "reqwest")]
/// Reqwest-backed [`Transport`] wrapper so shared HTTP behavior lives in one place.
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a transport from the timeout, proxy, and TLS settings of `config`.
	pub fn from_config(config: &HttpConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder()
			.timeout(Duration::from_secs(config.timeout))
			.danger_accept_invalid_certs(!config.verify_peer);

		if let Some(proxy) = &config.proxy {
			builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
		}

		Ok(Self(builder.build()?))
	}

	async fn execute(request: reqwest::RequestBuilder) -> Result<Response, TransportError> {
		let response = request.send().await?;
		let status = response.status().as_u16();
		let body = response.text().await?;

		Ok(Response { status, body })
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn get<'a>(&'a self, url: &'a Url, headers: &'a [Header]) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut request = self.0.get(url.clone());

			for (name, value) in headers {
				request = request.header(*name, value);
			}

			Self::execute(request).await
		})
	}

	fn post<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a [Header],
		body: &'a str,
	) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut request = self.0.post(url.clone()).body(body.to_owned());

			for (name, value) in headers {
				request = request.header(*name, value);
			}

			Self::execute(request).await
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn method_renders_uppercase() {
		assert_eq!(Method::Get.as_str(), "GET");
		assert_eq!(Method::Post.to_string(), "POST");
	}

	#[test]
	fn response_success_covers_2xx_only() {
		assert!(Response { status: 200, body: String::new() }.is_success());
		assert!(Response { status: 204, body: String::new() }.is_success());
		assert!(!Response { status: 301, body: String::new() }.is_success());
		assert!(!Response { status: 500, body: String::new() }.is_success());
	}
}
