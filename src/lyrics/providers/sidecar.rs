use std::io::ErrorKind;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::{LyricsProvider, LyricsRequest};

/// 与音频文件同名的 .lrc 文件
pub struct SidecarProvider;

#[async_trait]
impl LyricsProvider for SidecarProvider {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn lyrics_text(&self, request: &LyricsRequest<'_>) -> Result<Option<String>> {
        let lrc_path = request.audio_path.with_extension("lrc");
        if lrc_path == request.audio_path {
            return Ok(None);
        }

        match tokio::fs::read(&lrc_path).await {
            Ok(bytes) => {
                debug!("找到同名歌词文件: {:?}", lrc_path);
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
