//! HTTP client abstraction for testability

use std::time::Duration;

use async_trait::async_trait;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over HTTP client for dependency injection.
///
/// Each acquisition strategy carries its own header profile and timeout, so
/// both travel with the request instead of living on the client.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request with the given header profile and timeout
    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, &'static str)],
        timeout: Duration,
    ) -> crate::Result<HttpResponse>;

    /// Send a POST request with a JSON body
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, &'static str)],
        timeout: Duration,
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {} (timeout {:?})", url, timeout);
        let mut request = self.client.get(url).timeout(timeout);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| crate::MonitorError::Http(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::MonitorError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| crate::MonitorError::Http(format!("POST {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::MonitorError::Http(format!("Reading response body: {}", e)))?;

        tracing::debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A URL that will always refuse connections (port 1 is reserved and unbound)
    const UNREACHABLE_URL: &str = "http://127.0.0.1:1/test";

    #[tokio::test]
    async fn get_connection_refused_returns_http_error() {
        let client = ReqwestHttpClient::default();
        let err = client
            .get(UNREACHABLE_URL, &[], Duration::from_secs(5))
            .await
            .unwrap_err();

        match &err {
            crate::MonitorError::Http(msg) => {
                assert!(
                    msg.starts_with("GET http://127.0.0.1:1/test failed:"),
                    "{msg}"
                );
            }
            other => panic!("expected MonitorError::Http, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_with_headers_connection_refused_returns_http_error() {
        let client = ReqwestHttpClient::default();
        let err = client
            .get(
                UNREACHABLE_URL,
                &[("User-Agent", "test"), ("Accept", "text/html")],
                Duration::from_secs(5),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, crate::MonitorError::Http(_)));
    }

    #[tokio::test]
    async fn post_json_connection_refused_returns_http_error() {
        let client = ReqwestHttpClient::default();
        let body = serde_json::json!({"key": "value"});
        let err = client.post_json(UNREACHABLE_URL, &body).await.unwrap_err();

        match &err {
            crate::MonitorError::Http(msg) => {
                assert!(
                    msg.starts_with("POST http://127.0.0.1:1/test failed:"),
                    "{msg}"
                );
            }
            other => panic!("expected MonitorError::Http, got {other:?}"),
        }
    }

    #[test]
    fn success_statuses() {
        let ok = HttpResponse {
            status: 200,
            body: String::new(),
        };
        assert!(ok.is_success());

        let redirect = HttpResponse {
            status: 301,
            body: String::new(),
        };
        assert!(!redirect.is_success());

        let server_error = HttpResponse {
            status: 503,
            body: String::new(),
        };
        assert!(!server_error.is_success());
    }
}
