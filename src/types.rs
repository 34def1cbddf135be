use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 一组邀请码，迭代顺序固定（按字典序）
pub type TokenSet = BTreeSet<String>;

/// 搜索结果中的一条帖子
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub title: String,

    #[serde(rename = "selftext", default)]
    pub body: String,
}

impl Post {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub kind: Option<String>,
    pub data: Post,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

/// Discord webhook 的消息体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub content: String,
}
