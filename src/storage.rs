use crate::error::Result;
use crate::types::TokenSet;
use async_trait::async_trait;

#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Prepare the backend (create directories, tables, check connectivity).
    /// Must not create the persisted record itself.
    async fn init(&self) -> Result<()>;

    /// Load every token recorded so far. An absent record is an empty set.
    async fn load(&self) -> Result<TokenSet>;

    /// Record new tokens. An empty set is a no-op.
    async fn append(&self, tokens: &TokenSet) -> Result<()>;
}
