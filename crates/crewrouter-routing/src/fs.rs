//! File-reader collaborator
//!
//! The context analyzer reads file contents through this trait so hosts can
//! substitute virtual filesystems, and so read failures stay an injected
//! concern rather than a hard dependency on the local disk.

use async_trait::async_trait;

use crate::error::Result;

/// Reads file contents for context analysis
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read the full text of one file; fails per-file with an IO error
    async fn read(&self, path: &str) -> Result<String>;
}

/// File reader over the local filesystem
pub struct FsFileReader;

#[async_trait]
impl FileReader for FsFileReader {
    async fn read(&self, path: &str) -> Result<String> {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}
