use crate::error::{Result, ScannerError};
use crate::storage::SeenStore;
use crate::types::TokenSet;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// 创建数据库连接
    pub async fn new(database_url: &str) -> Result<Self> {
        info!("连接数据库: {}", redact_url(database_url));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| ScannerError::Config(format!("数据库连接失败: {}", e)))?;

        Ok(Self { pool })
    }
}

/// 去掉 URL 中的用户信息和查询参数，只用于日志
fn redact_url(url: &str) -> String {
    let url = url.split('?').next().unwrap_or(url);
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}

#[async_trait]
impl SeenStore for SqliteStore {
    /// 初始化数据库表
    async fn init(&self) -> Result<()> {
        info!("初始化数据库表结构");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS seen_tokens (
                token TEXT PRIMARY KEY,
                first_seen_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ScannerError::Storage(format!("创建 seen_tokens 表失败: {}", e)))?;

        info!("数据库表结构初始化完成");
        Ok(())
    }

    async fn load(&self) -> Result<TokenSet> {
        let rows = sqlx::query("SELECT token FROM seen_tokens")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ScannerError::Storage(format!("查询邀请码失败: {}", e)))?;

        let tokens: TokenSet = rows.iter().map(|row| row.get::<String, _>("token")).collect();
        debug!("从数据库加载 {} 个邀请码", tokens.len());
        Ok(tokens)
    }

    /// 批量写入，已存在的邀请码保留首次出现时间
    async fn append(&self, tokens: &TokenSet) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ScannerError::Storage(format!("开启事务失败: {}", e)))?;

        for token in tokens {
            sqlx::query("INSERT OR IGNORE INTO seen_tokens (token, first_seen_at) VALUES (?, ?)")
                .bind(token)
                .bind(&now)
                .execute(&mut *tx)
                .await
                .map_err(|e| ScannerError::Storage(format!("保存邀请码失败: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| ScannerError::Storage(format!("提交事务失败: {}", e)))?;

        debug!("已保存 {} 个邀请码到数据库", tokens.len());
        Ok(())
    }
}
