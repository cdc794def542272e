use std::future::Future;
use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::error::BoxError;

// best effort parsing of headers, anything invalid is ignored
fn parse_headers(headers: &[(String, String)]) -> HeaderMap {
    let mut parsed_headers = HeaderMap::new();

    for (key, value) in headers {
        let Ok(key) = HeaderName::try_from(key.as_str()) else {
            continue;
        };

        let Ok(value) = HeaderValue::try_from(value.as_str()) else {
            continue;
        };

        parsed_headers.insert(key, value);
    }

    parsed_headers
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, BoxError>> + Send {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .headers(parse_headers(&request.headers))
            .timeout(self.timeout);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        async move {
            let response = builder.send().await?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(key, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (key.to_string(), value.to_string()))
                })
                .collect();

            let body = response.text().await?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");

            let mut received = Vec::new();
            let mut buffer = [0u8; 1024];
            while !received.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = socket.read(&mut buffer).await.expect("read");
                if read == 0 {
                    break;
                }
                received.extend_from_slice(&buffer[..read]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write");
            socket.shutdown().await.ok();
        });

        format!("http://{address}")
    }

    #[test]
    fn invalid_headers_are_skipped() {
        let headers = vec![
            ("authorization".to_string(), "Bearer abc".to_string()),
            ("bad header".to_string(), "x".to_string()),
        ];

        let parsed = parse_headers(&headers);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["authorization"], "Bearer abc");
    }

    #[tokio::test]
    async fn send_returns_status_and_body() {
        let base = serve_once("200 OK", r#"{"results":{"security":[]}}"#).await;
        let transport = ReqwestTransport::new(Duration::from_secs(5));

        let response = transport
            .send(&HttpRequest::get(format!("{base}/results/t1")))
            .await
            .expect("request should succeed");

        assert_eq!(response.status, 200);
        assert_eq!(
            response.json().expect("json body"),
            json!({"results": {"security": []}})
        );
    }

    #[tokio::test]
    async fn error_statuses_are_responses_not_failures() {
        let base = serve_once("503 Service Unavailable", "{}").await;
        let transport = ReqwestTransport::new(Duration::from_secs(5));

        let response = transport
            .send(&HttpRequest::post(format!("{base}/initialize"), json!({})))
            .await
            .expect("status codes are not transport failures");

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }
}
