use anyhow::Result;
use async_trait::async_trait;

use super::{LyricsProvider, LyricsRequest};

/// 从音频标签中读取嵌入歌词
pub struct EmbeddedProvider;

#[async_trait]
impl LyricsProvider for EmbeddedProvider {
    fn name(&self) -> &str {
        "embedded"
    }

    async fn lyrics_text(&self, request: &LyricsRequest<'_>) -> Result<Option<String>> {
        Ok(request
            .tags
            .and_then(|tags| tags.lyrics_text())
            .map(str::to_string))
    }
}
