// src/fetch.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// HTTP collaborator used by the content-scan step.
/// Any failure (network, timeout, non-2xx) is reported as `None`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        headers: &[(String, String)],
    ) -> Option<String>;

    fn name(&self) -> &'static str;
}

/// Bytes read from a page before the rest of the body is dropped.
/// Publication dates sit in the head or near the top of the article.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Append `chunk` up to `cap` total bytes. Returns true once the cap is hit.
fn push_capped(buf: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    buf.len() >= cap
}

/// Production fetcher over a shared `reqwest::Client`.
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .build()
            .context("building reqwest client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        headers: &[(String, String)],
    ) -> Option<String> {
        let mut req = self.http.get(url).timeout(timeout);
        for (k, v) in headers {
            req = req.header(k.as_str(), v.as_str());
        }
        let mut resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(target: "content_scan", error = %e, "page fetch failed");
                return None;
            }
        };
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(target: "content_scan", %status, "page fetch non-2xx");
            return None;
        }
        let mut body = Vec::with_capacity(
            resp.content_length()
                .map(|n| (n as usize).min(MAX_BODY_BYTES))
                .unwrap_or(64 * 1024),
        );
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    if push_capped(&mut body, &chunk, MAX_BODY_BYTES) {
                        tracing::debug!(target: "content_scan", cap = MAX_BODY_BYTES, "page body truncated");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(target: "content_scan", error = %e, "page body read failed");
                    return None;
                }
            }
        }
        Some(String::from_utf8_lossy(&body).into_owned())
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

// --- Test helper ---

/// Serves fixed bodies by URL; unknown URLs behave like a 404.
/// Records every request so tests can assert on fetch counts and headers.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    pub calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    delay: Option<Duration>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Sleep before answering, to exercise caller-side timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(
        &self,
        url: &str,
        _timeout: Duration,
        headers: &[(String, String)],
    ) -> Option<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), headers.to_vec()));
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.pages.get(url).cloned()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_stops_growing_at_the_cap() {
        let mut buf = Vec::new();
        assert!(!push_capped(&mut buf, b"<html><head>", 16));
        assert!(push_capped(&mut buf, b"<meta name=date>", 16));
        assert_eq!(buf, b"<html><head><met");
        assert!(push_capped(&mut buf, b"more", 16));
        assert_eq!(buf.len(), 16);
    }

    #[test]
    fn small_bodies_are_kept_whole() {
        let mut buf = Vec::new();
        assert!(!push_capped(&mut buf, b"ok", MAX_BODY_BYTES));
        assert_eq!(buf, b"ok");
    }
}
