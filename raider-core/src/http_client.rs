use crate::error::RaiderError;
use crate::transport::TransportConfig;
use async_trait::async_trait;
use tracing::{debug, warn};

/// One outbound HTTP call, already lowered from a `Request` template by
/// `raider-flow`.
#[derive(Debug, Clone)]
pub struct HttpRequestSpec {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub cookie_header: Option<String>,
    pub body: Option<Vec<u8>>,
}

/// The bound response: `(status, headers, set_cookies, body)`.
#[derive(Debug, Clone)]
pub struct HttpResponseSpec {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub set_cookies: Vec<String>,
    pub body: Vec<u8>,
}

/// Pluggable HTTP transport. The core only depends on this trait;
/// `ReqwestHttpClient` is the default implementation.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequestSpec) -> Result<HttpResponseSpec, RaiderError>;
}

/// Default `HttpClient` backed by `reqwest::Client`. Follows redirects by
/// default and never runs its own cookie jar — Raider's `CookieJar` owns
/// that state so it can be dumped and reloaded independently.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, RaiderError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(transport.user_agent.clone())
            .timeout(transport.timeout)
            .danger_accept_invalid_certs(!transport.verify_tls)
            .cookie_store(false);

        if let Some(proxy_url) = &transport.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequestSpec) -> Result<HttpResponseSpec, RaiderError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| RaiderError::Transport(e.to_string()))?;

        let mut builder = self.client.request(method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(cookie) = &request.cookie_header {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "request failed");
            RaiderError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let mut headers = Vec::new();
        let mut set_cookies = Vec::new();
        for (name, value) in response.headers() {
            let value_str = value.to_str().unwrap_or_default().to_string();
            if name.as_str().eq_ignore_ascii_case("set-cookie") {
                set_cookies.push(value_str.clone());
            }
            headers.push((name.as_str().to_string(), value_str));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RaiderError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponseSpec {
            status,
            headers,
            set_cookies,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn send_round_trips_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "sid=abc; Path=/")
                    .set_body_string("hello"),
            )
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new(&TransportConfig::default()).unwrap();
        let response = client
            .send(HttpRequestSpec {
                method: "GET".into(),
                url: format!("{}/login", server.uri()),
                headers: vec![],
                cookie_header: None,
                body: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"hello");
        assert_eq!(response.set_cookies, vec!["sid=abc; Path=/".to_string()]);
    }

    #[tokio::test]
    async fn send_forwards_request_headers_and_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new(&TransportConfig::default()).unwrap();
        let response = client
            .send(HttpRequestSpec {
                method: "POST".into(),
                url: format!("{}/submit", server.uri()),
                headers: vec![("x-csrf".into(), "tok".into())],
                cookie_header: Some("sid=abc".into()),
                body: Some(b"payload".to_vec()),
            })
            .await
            .unwrap();

        assert_eq!(response.status, 204);
    }
}
