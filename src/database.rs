use crate::error::{Result, ScannerError};
use crate::storage::SeenStore;
use crate::types::TokenSet;
use async_trait::async_trait;
use log::{debug, info};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// 以 Redis Set 保存已发现的邀请码
pub struct RedisStore {
    conn: ConnectionManager,
    key: String,
}

impl RedisStore {
    /// 创建 Redis 连接
    pub async fn new(redis_url: &str, key: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| ScannerError::Config(format!("Redis 客户端创建失败: {}", e)))?;

        // 只记录地址，URL 中可能带密码
        info!("连接 Redis: {}", client.get_connection_info().addr);

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| ScannerError::Config(format!("Redis 连接失败: {}", e)))?;

        info!("Redis 连接成功");
        Ok(Self {
            conn,
            key: key.into(),
        })
    }
}

#[async_trait]
impl SeenStore for RedisStore {
    /// Redis 不需要 schema，只检查连通性
    async fn init(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| ScannerError::Storage(format!("Redis PING 失败: {}", e)))?;

        info!("Redis 初始化完成，邀请码集合: {}", self.key);
        Ok(())
    }

    async fn load(&self) -> Result<TokenSet> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .smembers(&self.key)
            .await
            .map_err(|e| ScannerError::Storage(format!("读取邀请码集合失败: {}", e)))?;

        debug!("从 Redis 加载 {} 个邀请码", members.len());
        Ok(members.into_iter().collect())
    }

    async fn append(&self, tokens: &TokenSet) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.clone();
        let members: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let _: () = conn
            .sadd(&self.key, members)
            .await
            .map_err(|e| ScannerError::Storage(format!("写入邀请码集合失败: {}", e)))?;

        debug!("已写入 {} 个邀请码到 Redis", tokens.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 需要本地 Redis: REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn redis_set_round_trip() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let key = format!("sora:codes:test:{}", std::process::id());
        let store = RedisStore::new(&url, key.clone()).await.unwrap();
        store.init().await.unwrap();

        let tokens: TokenSet = ["CODE1234", "NEWCODE99"].iter().map(|s| s.to_string()).collect();
        store.append(&tokens).await.unwrap();
        store.append(&tokens).await.unwrap();

        assert_eq!(store.load().await.unwrap(), tokens);

        let mut conn = store.conn.clone();
        let _: () = conn.del(&key).await.unwrap();
    }
}
