//! HTTP fetching.
//!
//! The poller only needs "give me the body at this URL", so that is all the
//! [`Fetch`] trait asks for.  Tests swap in a stub; production uses
//! [`HttpFetcher`] wrapped in a [`CachedFetcher`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::FetchError;

/// Source of raw response bodies.
///
/// Must be [`Sync`] because a poll pass fetches several providers at once.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking `reqwest` client with a per-request timeout.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// Caches successful bodies per URL for `ttl`.
///
/// Failures are never cached, so a flaky vendor is retried on the next pass.
pub struct CachedFetcher<F> {
    inner: F,
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Vec<u8>)>>,
}

impl<F: Fetch> CachedFetcher<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lookup(&self, url: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock();
        match entries.get(url) {
            Some((stored, body)) if stored.elapsed() < self.ttl => Some(body.clone()),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }
}

impl<F: Fetch> Fetch for CachedFetcher<F> {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if self.ttl.is_zero() {
            return self.inner.get(url);
        }
        if let Some(body) = self.lookup(url) {
            debug!(url, "cache hit");
            return Ok(body);
        }

        // The lock is not held across the request; two concurrent misses on
        // the same URL both fetch and the later one wins.
        let body = self.inner.get(url)?;
        self.entries
            .lock()
            .insert(url.to_string(), (Instant::now(), body.clone()));
        Ok(body)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Canned responses keyed by URL; anything else is a 404.
    pub struct StubFetcher {
        pub bodies: HashMap<String, Result<Vec<u8>, u16>>,
        pub calls: AtomicUsize,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self {
                bodies: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn body(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), Ok(body.as_bytes().to_vec()));
            self
        }

        pub fn status(mut self, url: &str, code: u16) -> Self {
            self.bodies.insert(url.to_string(), Err(code));
            self
        }
    }

    impl Fetch for StubFetcher {
        fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.bodies.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(code)) => Err(FetchError::Status(*code)),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    /// A local server that accepts one connection and answers with `reply`.
    fn serve_once(reply: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(reply.as_bytes());
            }
        });
        format!("http://{addr}/status.json")
    }

    #[test]
    fn http_fetcher_returns_body_on_2xx() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 24\r\nConnection: close\r\n\r\n{\"status\":\"operational\"}",
        );
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let body = fetcher.get(&url).unwrap();
        assert_eq!(body, br#"{"status":"operational"}"#);
    }

    #[test]
    fn http_fetcher_rejects_non_2xx() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        assert!(matches!(fetcher.get(&url), Err(FetchError::Status(503))));
    }

    #[test]
    fn http_fetcher_times_out() {
        // Accept the connection but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let conn = listener.accept();
            thread::sleep(Duration::from_secs(2));
            drop(conn);
        });

        let fetcher = HttpFetcher::new(Duration::from_millis(200)).unwrap();
        let err = fetcher.get(&format!("http://{addr}/")).unwrap_err();
        assert!(matches!(err, FetchError::Network(ref e) if e.is_timeout()));
        handle.join().unwrap();
    }

    #[test]
    fn cache_serves_repeat_requests_within_ttl() {
        let cached = CachedFetcher::new(
            StubFetcher::new().body("https://a.example/", "hello"),
            Duration::from_secs(60),
        );
        assert_eq!(cached.get("https://a.example/").unwrap(), b"hello");
        assert_eq!(cached.get("https://a.example/").unwrap(), b"hello");
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let cached = CachedFetcher::new(
            StubFetcher::new().status("https://a.example/", 500),
            Duration::from_secs(60),
        );
        assert!(cached.get("https://a.example/").is_err());
        assert!(cached.get("https://a.example/").is_err());
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let cached = CachedFetcher::new(
            StubFetcher::new().body("https://a.example/", "x"),
            Duration::ZERO,
        );
        cached.get("https://a.example/").unwrap();
        cached.get("https://a.example/").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expired_entries_are_refetched() {
        let cached = CachedFetcher::new(
            StubFetcher::new().body("https://a.example/", "x"),
            Duration::from_millis(10),
        );
        cached.get("https://a.example/").unwrap();
        thread::sleep(Duration::from_millis(30));
        cached.get("https://a.example/").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }
}
