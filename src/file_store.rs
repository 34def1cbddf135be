use crate::error::{Result, ScannerError};
use crate::storage::SeenStore;
use crate::types::TokenSet;
use async_trait::async_trait;
use log::{debug, info};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Newline-delimited text file, one token per line, append-only.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn ends_with_newline(file: &mut File) -> Result<bool> {
    let len = file
        .metadata()
        .await
        .map_err(|e| ScannerError::Storage(format!("Failed to stat codes file: {}", e)))?
        .len();
    if len == 0 {
        return Ok(true);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .await
        .map_err(|e| ScannerError::Storage(format!("Failed to seek codes file: {}", e)))?;
    file.read_exact(&mut last)
        .await
        .map_err(|e| ScannerError::Storage(format!("Failed to read codes file: {}", e)))?;
    Ok(last[0] == b'\n')
}

#[async_trait]
impl SeenStore for FileStore {
    async fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ScannerError::Storage(format!("Failed to create data directory: {}", e))
                })?;
            }
        }

        info!("Using codes file {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<TokenSet> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Codes file {} not found, starting empty", self.path.display());
                return Ok(TokenSet::new());
            }
            Err(e) => {
                return Err(ScannerError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let tokens: TokenSet = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!("Loaded {} codes from {}", tokens.len(), self.path.display());
        Ok(tokens)
    }

    async fn append(&self, tokens: &TokenSet) -> Result<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for token in tokens {
            buf.push_str(token);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ScannerError::Storage(format!("Failed to open codes file: {}", e)))?;

        // A hand-edited file may lack the final newline
        if !ends_with_newline(&mut file).await? {
            buf.insert(0, '\n');
        }

        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| ScannerError::Storage(format!("Failed to write codes file: {}", e)))?;

        file.flush()
            .await
            .map_err(|e| ScannerError::Storage(format!("Failed to flush codes file: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| ScannerError::Storage(format!("Failed to sync codes file: {}", e)))?;

        debug!("Appended {} codes to {}", tokens.len(), self.path.display());
        Ok(())
    }
}
