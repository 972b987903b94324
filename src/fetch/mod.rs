// src/fetch/mod.rs

use crate::error::{ImportError, Result};
use reqwest::Client;
use tracing::{debug, instrument};

/// GET `url` once and return the body as text.
///
/// Any non-2xx status is an `Http` error carrying the status; the error
/// body is dropped. Transport failures are `Http` errors without a status.
#[instrument(level = "info", skip(client))]
pub async fn fetch_csv(client: &Client, url: &str) -> Result<String> {
    let transport = |source: reqwest::Error| ImportError::Http {
        url: url.to_string(),
        status: source.status(),
        source: Some(source),
    };

    let resp = client.get(url).send().await.map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ImportError::Http {
            url: url.to_string(),
            status: Some(status),
            source: None,
        });
    }

    let body = resp.text().await.map_err(transport)?;
    debug!(bytes = body.len(), %status, "fetched");
    Ok(body)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response to every connection. Returns the base
    /// URL and a counter of accepted connections.
    pub(crate) async fn serve(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        (format!("http://{}", addr), hits)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let (base, hits) = serve("200 OK", "a,b\n1,x\n2,y\n").await;
        let body = fetch_csv(&Client::new(), &format!("{}/data.csv", base))
            .await
            .unwrap();
        assert_eq!(body, "a,b\n1,x\n2,y\n");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_404_is_http_error() {
        let (base, _) = serve("404 Not Found", "no such file").await;
        let url = format!("{}/missing.csv", base);
        let err = fetch_csv(&Client::new(), &url).await.unwrap_err();
        match err {
            ImportError::Http { status, url: u, .. } => {
                assert_eq!(status, Some(reqwest::StatusCode::NOT_FOUND));
                assert_eq!(u, url);
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_is_http_error() {
        let (base, _) = serve("500 Internal Server Error", "").await;
        let err = fetch_csv(&Client::new(), &format!("{}/x.csv", base))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "HttpError");
    }

    #[tokio::test]
    async fn test_refused_connection_is_http_error() {
        let err = fetch_csv(&Client::new(), "http://127.0.0.1:1/x.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Http { status: None, .. }));
    }
}
