use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("搜索请求失败: {0}")]
    Fetch(String),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("Webhook 推送失败: {0}")]
    Delivery(String),

    #[error("配置错误: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScannerError>;
