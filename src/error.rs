use std::path::PathBuf;

use thiserror::Error;

/// 播放器外围错误（歌词引擎本身不产生错误）
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("读取文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("读取音频标签失败: {0}")]
    Metadata(#[from] lofty::error::LoftyError),

    #[error("解析配置文件失败: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("后台任务异常退出: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("尚未加载任何曲目")]
    NoTrack,
}

impl PlayerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
