#![allow(dead_code)]

use async_trait::async_trait;
use sora_scanner::{Notifier, Post, Result, ScannerError, SeenStore, Source, TokenSet, WebhookPayload};
use std::sync::Mutex;

pub fn set(items: &[&str]) -> TokenSet {
    items.iter().map(|s| s.to_string()).collect()
}

/// Returns canned posts, or a fetch error when `fail` is set.
pub struct FakeSource {
    pub posts: Vec<Post>,
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String, u32)>>,
}

impl FakeSource {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            posts: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Source for FakeSource {
    async fn search(&self, scope: &str, query: &str, limit: u32) -> Result<Vec<Post>> {
        self.calls
            .lock()
            .unwrap()
            .push((scope.to_string(), query.to_string(), limit));
        if self.fail {
            return Err(ScannerError::Fetch("rate limited".to_string()));
        }
        Ok(self.posts.iter().take(limit as usize).cloned().collect())
    }
}

/// In-memory seen set that records every append call.
#[derive(Default)]
pub struct MemoryStore {
    pub tokens: Mutex<TokenSet>,
    pub appends: Mutex<Vec<TokenSet>>,
    pub fail_load: bool,
    pub fail_append: bool,
}

impl MemoryStore {
    pub fn seeded(items: &[&str]) -> Self {
        Self {
            tokens: Mutex::new(set(items)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn load(&self) -> Result<TokenSet> {
        if self.fail_load {
            return Err(ScannerError::Storage("permission denied".to_string()));
        }
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn append(&self, tokens: &TokenSet) -> Result<()> {
        if self.fail_append {
            return Err(ScannerError::Storage("disk full".to_string()));
        }
        if tokens.is_empty() {
            return Ok(());
        }
        self.appends.lock().unwrap().push(tokens.clone());
        self.tokens.lock().unwrap().extend(tokens.iter().cloned());
        Ok(())
    }
}

/// Records delivered payloads, optionally failing every delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    pub delivered: Mutex<Vec<WebhookPayload>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        self.delivered.lock().unwrap().push(payload.clone());
        if self.fail {
            return Err(ScannerError::Delivery("HTTP 500".to_string()));
        }
        Ok(())
    }
}
