use crate::CrawlerError;
use tokio::{
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

#[async_trait::async_trait]
pub trait Fetch {
    /// Body of the page at `url`.
    async fn fetch(&self, url: &str) -> Result<String, CrawlerError>;
}

/// HTTP client that spaces out requests and retries failed ones.
pub struct Fetcher {
    client: reqwest::Client,
    request_delay: Duration,
    attempts: u32,
    last_request: Mutex<Option<Instant>>,
}

impl Fetcher {
    pub fn new(request_delay: Duration, attempts: u32) -> Self {
        Fetcher {
            client: reqwest::Client::new(),
            request_delay,
            attempts: attempts.max(1),
            last_request: Mutex::new(None),
        }
    }

    async fn wait_turn(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = last_request.take() {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < self.request_delay {
                tokio::time::sleep(self.request_delay - elapsed).await;
            }
        }
        last_request.replace(Instant::now());
    }

    async fn get(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait::async_trait]
impl Fetch for Fetcher {
    async fn fetch(&self, url: &str) -> Result<String, CrawlerError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.wait_turn().await;

            debug!("Visit {}", url);
            match self.get(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.attempts => {
                    warn!(
                        "Fetching {} failed: {}, retrying [{}/{}]",
                        url, e, attempt, self.attempts
                    );
                }
                Err(source) => {
                    return Err(CrawlerError::Fetch {
                        url: url.to_string(),
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    #[tokio::test(start_paused = true)]
    async fn requests_are_spaced() {
        let fetcher = Fetcher::new(Duration::from_millis(200), 1);
        let start = Instant::now();

        fetcher.wait_turn().await;
        fetcher.wait_turn().await;
        fetcher.wait_turn().await;

        assert!(Instant::now().duration_since(start) >= Duration::from_millis(400));
    }

    /// Answers the first `failures` requests with a 500, then with `body`.
    async fn flaky_server(failures: usize, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for i in 0.. {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = if i < failures {
                    "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string()
                } else {
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                };
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });
        format!("http://{}/rmrb/s", addr)
    }

    #[tokio::test]
    async fn failed_request_is_retried() {
        let url = flaky_server(2, "<html></html>").await;
        let fetcher = Fetcher::new(Duration::ZERO, 3);

        assert_eq!(fetcher.fetch(&url).await.unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn server_error_on_every_attempt_fails() {
        let url = flaky_server(3, "<html></html>").await;
        let fetcher = Fetcher::new(Duration::ZERO, 3);

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, CrawlerError::Fetch { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn unreachable_host_fails_after_all_attempts() {
        let fetcher = Fetcher::new(Duration::ZERO, 2);

        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, CrawlerError::Fetch { attempts: 2, .. }));
    }
}
