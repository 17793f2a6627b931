use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::engine::LayoutMetrics;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 启用的歌词源列表（按优先级）
    pub lyrics_sources: Vec<String>,

    /// 歌词引擎设置
    pub engine: EngineConfig,

    /// 歌词排版参数
    pub layout: LayoutMetrics,

    /// 显示设置
    pub display: DisplayConfig,

    /// 播放控制设置
    pub player: PlayerSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// 播放时间轮询间隔（毫秒）
    pub poll_interval_ms: u64,

    /// 手动滚动无操作后回到自动跟随的时间（毫秒）
    pub idle_timeout_ms: u64,

    /// 终端滚轮每格对应的 deltaY
    pub wheel_delta: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// 是否启用简单输出模式（适用于waybar等外部集成）
    pub simple_output: bool,

    /// 简单输出模式下是否以 JSON 行输出
    pub json_output: bool,

    /// 是否启用 TUI 界面（简单输出模式时自动禁用）
    pub enable_tui: bool,

    /// 终端中每行对应的像素数，用于把排版偏移换算为行号
    pub px_per_row: f32,

    /// 简单输出模式下是否显示时间戳
    pub show_timestamp: bool,
}

/// 播放控制设置
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerSettings {
    /// 初始音量 (0.0 - 1.0)
    pub initial_volume: f32,

    /// 快进/快退步长（秒）
    pub seek_step_secs: f64,

    /// 音量调节步长
    pub volume_step: f32,

    /// 加载完成后是否自动播放
    pub autoplay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lyrics_sources: vec!["embedded".to_string(), "sidecar".to_string()],
            engine: EngineConfig::default(),
            layout: LayoutMetrics::default(),
            display: DisplayConfig::default(),
            player: PlayerSettings::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            idle_timeout_ms: 5000,
            wheel_delta: 60.0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            simple_output: false,
            json_output: false,
            enable_tui: true,
            px_per_row: 40.0,
            show_timestamp: false,
        }
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            seek_step_secs: 5.0,
            volume_step: 0.05,
            autoplay: true,
        }
    }
}

impl EngineConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl Config {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        let pkg_name = env!("CARGO_PKG_NAME");
        dirs::config_dir()
            .map(|p| p.join(pkg_name).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(format!("{}-config.toml", pkg_name)))
    }

    /// 加载配置，支持从指定路径或默认路径加载
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_path);

        debug!("尝试从 {:?} 加载配置文件", config_path);

        if !config_path.exists() {
            debug!("配置文件 {:?} 不存在，将创建默认配置", config_path);
            let default_config = Config::default();
            let toml = toml::to_string_pretty(&default_config)?;

            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
                debug!("已确保目录 {:?} 存在", parent);
            }

            fs::write(&config_path, toml)?;
            info!("已创建默认配置文件: {:?}", config_path);
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)?;
        let config = Self::from_toml(&content).unwrap_or_else(|e| {
            error!("解析配置文件 {:?} 失败: {}", config_path, e);
            warn!("由于解析错误，将加载默认配置");
            Config::default()
        });

        debug!("已成功加载配置文件");
        Ok(config)
    }

    /// 从 TOML 文本解析配置，缺失字段使用默认值
    pub fn from_toml(content: &str) -> Result<Self, crate::PlayerError> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// 修正越界取值，命令行覆盖后也需调用
    pub fn normalize(&mut self) {
        self.player.initial_volume = self.player.initial_volume.clamp(0.0, 1.0);
        if self.display.px_per_row <= 0.0 {
            warn!("px_per_row 必须为正数，使用默认值");
            self.display.px_per_row = DisplayConfig::default().px_per_row;
        }
        if self.display.simple_output {
            self.display.enable_tui = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
lyrics_sources = ["sidecar"]

[engine]
idle_timeout_ms = 3000

[player]
initial_volume = 4.0
"#,
        )
        .unwrap();

        assert_eq!(config.lyrics_sources, vec!["sidecar"]);
        assert_eq!(config.engine.idle_timeout(), Duration::from_secs(3));
        assert_eq!(config.engine.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.player.initial_volume, 1.0);
        assert_eq!(config.layout.line_spacing, 120.0);
    }

    #[test]
    fn test_simple_output_disables_tui() {
        let config = Config::from_toml("[display]\nsimple_output = true\n").unwrap();
        assert!(!config.display.enable_tui);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(Config::from_toml("lyrics_sources = 3").is_err());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = env::temp_dir().join(format!("lyric-stage-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        let config = Config::load(Some(path.clone())).unwrap();
        assert!(path.exists());
        assert_eq!(config.engine.idle_timeout_ms, 5000);

        let _ = fs::remove_dir_all(&dir);
    }
}
