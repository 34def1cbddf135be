use crate::error::{Result, ScannerError};
use crate::types::{AccessToken, Listing, Post};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

const AUTH_API_BASE: &str = "https://www.reddit.com";
const OAUTH_API_BASE: &str = "https://oauth.reddit.com";

/// 帖子来源
#[async_trait]
pub trait Source: Send + Sync {
    /// 在 `scope` 范围内搜索 `query`，最多返回 `limit` 条结果。每次调用都会重新请求上游。
    async fn search(&self, scope: &str, query: &str, limit: u32) -> Result<Vec<Post>>;
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

pub struct RedditClient {
    client: Client,
    credentials: RedditCredentials,
    auth_base: String,
    api_base: String,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(credentials.user_agent.clone())
            .build()
            .map_err(|e| ScannerError::Config(format!("HTTP 客户端创建失败: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            auth_base: AUTH_API_BASE.to_string(),
            api_base: OAUTH_API_BASE.to_string(),
        })
    }

    /// 替换授权与搜索接口的地址（测试时指向 mock 服务）
    pub fn with_base_urls(mut self, auth_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.auth_base = auth_base.into().trim_end_matches('/').to_string();
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// 以 client credentials 方式获取应用级 access token
    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/api/v1/access_token", self.auth_base);

        debug!("请求 Reddit access token: {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ScannerError::Fetch(format!("授权请求失败: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("授权失败 [{}]: {}", status, text);
            return Err(ScannerError::Fetch(format!("授权失败 HTTP {}", status)));
        }

        let token: AccessToken = response
            .json()
            .await
            .map_err(|e| ScannerError::Fetch(format!("授权响应解析失败: {}", e)))?;

        debug!(
            "获取 access token 成功 (type={:?}, expires_in={:?})",
            token.token_type, token.expires_in
        );
        Ok(token.access_token)
    }
}

#[async_trait]
impl Source for RedditClient {
    async fn search(&self, scope: &str, query: &str, limit: u32) -> Result<Vec<Post>> {
        let token = self.access_token().await?;
        let url = format!("{}/r/{}/search", self.api_base, scope);
        let restrict_sr = !scope.eq_ignore_ascii_case("all");

        debug!("搜索 Reddit: r/{} q={:?} limit={}", scope, query, limit);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("restrict_sr", restrict_sr.to_string()),
                ("sort", "relevance".to_string()),
                ("syntax", "lucene".to_string()),
                ("t", "all".to_string()),
                ("raw_json", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ScannerError::Fetch(format!("搜索请求失败: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("搜索请求失败 [{}]: {}", status, text);
            return Err(ScannerError::Fetch(format!("HTTP {}: {}", status, text)));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| ScannerError::Fetch(format!("搜索响应解析失败: {}", e)))?;

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .filter(|thing| thing.kind.as_deref().map_or(true, |kind| kind == "t3"))
            .map(|thing| thing.data)
            .take(limit as usize)
            .collect();

        debug!("成功获取 {} 条帖子", posts.len());
        Ok(posts)
    }
}
