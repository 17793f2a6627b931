use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use super::{LyricsProvider, LyricsRequest};
use crate::PlayerError;

/// 用户显式指定的歌词文件
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl LyricsProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn lyrics_text(&self, _request: &LyricsRequest<'_>) -> Result<Option<String>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| PlayerError::io(&self.path, e))?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}
