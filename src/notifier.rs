use crate::error::{Result, ScannerError};
use crate::types::{TokenSet, WebhookPayload};
use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_HEADER: &str = "New Sora codes found:";

/// 通知出口
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()>;
}

pub struct DiscordWebhook {
    client: Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScannerError::Config(format!("HTTP 客户端创建失败: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ScannerError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScannerError::Delivery(format!("HTTP {}", response.status())));
        }

        Ok(())
    }
}

/// 将邀请码拼成一条消息：首行为 `header`，之后每行一个邀请码
pub fn build_payload(header: &str, tokens: &TokenSet) -> WebhookPayload {
    let body = tokens
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    WebhookPayload {
        content: format!("{}\n{}", header, body),
    }
}

/// 推送新邀请码。失败只记录日志，不重试、不向上传播。
///
/// 返回是否推送成功；`tokens` 为空时不发请求并返回 `false`。
pub async fn notify<N: Notifier + ?Sized>(notifier: &N, header: &str, tokens: &TokenSet) -> bool {
    if tokens.is_empty() {
        return false;
    }

    let payload = build_payload(header, tokens);
    match notifier.deliver(&payload).await {
        Ok(()) => {
            info!("已推送 {} 个新邀请码", tokens.len());
            true
        }
        Err(e) => {
            error!("推送失败: {}", e);
            false
        }
    }
}
