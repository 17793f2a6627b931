mod embedded;
mod file;
mod sidecar;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::lyrics::TagBag;

pub use embedded::EmbeddedProvider;
pub use file::FileProvider;
pub use sidecar::SidecarProvider;

/// 一次歌词查找请求
#[derive(Debug, Clone, Copy)]
pub struct LyricsRequest<'a> {
    /// 音频文件路径
    pub audio_path: &'a Path,
    /// 已读取的标签（读取失败时为 None）
    pub tags: Option<&'a TagBag>,
}

/// 歌词提供者接口
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// 获取提供者名称
    fn name(&self) -> &str;

    /// 查找原始歌词文本
    async fn lyrics_text(&self, request: &LyricsRequest<'_>) -> Result<Option<String>>;
}

/// 获取所有启用的歌词提供者
///
/// 通过命令行指定的 LRC 文件优先于配置中的所有来源。
pub fn get_enabled_providers(
    config: &Config,
    lrc_override: Option<PathBuf>,
) -> Vec<Arc<dyn LyricsProvider>> {
    let mut providers: Vec<Arc<dyn LyricsProvider>> = Vec::new();

    debug!("加载启用的歌词提供者，配置的源: {:?}", config.lyrics_sources);

    if let Some(path) = lrc_override {
        info!("使用指定的歌词文件: {:?}", path);
        providers.push(Arc::new(FileProvider::new(path)));
    }

    for source in &config.lyrics_sources {
        match source.as_str() {
            "embedded" | "tags" => {
                providers.push(Arc::new(EmbeddedProvider));
            }
            "sidecar" | "lrc" => {
                providers.push(Arc::new(SidecarProvider));
            }
            _ => {
                warn!("未知的歌词源: {}", source);
            }
        }
    }

    for (i, provider) in providers.iter().enumerate() {
        debug!("歌词提供者 #{}: {}", i + 1, provider.name());
    }

    providers
}
