use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;
use crate::display;
use crate::lyrics::providers::get_enabled_providers;
use crate::lyrics::LyricsResolver;
use crate::player::{LoftyMetadata, Player, PlayerEvent};
use crate::tui::TuiApp;

pub struct App {
    config: Arc<Config>,
    lrc_override: Option<PathBuf>,
}

impl App {
    /// 创建新应用实例
    pub fn new(config: Arc<Config>, lrc_override: Option<PathBuf>) -> Self {
        Self {
            config,
            lrc_override,
        }
    }

    /// 装配播放器，歌词来源按配置顺序排列
    pub fn build_player(&self) -> Player {
        let providers = get_enabled_providers(&self.config, self.lrc_override.clone());
        let player = Player::new(
            &self.config,
            Arc::new(LoftyMetadata),
            LyricsResolver::new(providers),
        );
        debug!("歌词来源: {:?}", player.lyrics_sources());
        player
    }

    /// 运行应用：加载曲目后进入 TUI 或简单输出模式
    pub async fn run(&mut self, track: PathBuf) -> Result<()> {
        let (tx, rx) = mpsc::channel::<PlayerEvent>(16);
        let mut player = self.build_player();
        player.set_event_sender(tx);
        player.load(track);

        if self.config.display.enable_tui {
            debug!("启动 TUI 模式");
            let mut app = TuiApp::new(Arc::clone(&self.config), player);
            app.run(rx).await?;
        } else {
            debug!("启动简单输出模式");
            display::run_simple_output(&self.config, player, rx).await?;
        }

        info!("应用执行完毕");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_uses_configured_sources() {
        let mut config = Config::default();
        config.lyrics_sources = vec!["sidecar".into()];
        let app = App::new(Arc::new(config), Some(PathBuf::from("/tmp/override.lrc")));

        let player = app.build_player();
        assert_eq!(player.lyrics_sources(), vec!["file", "sidecar"]);
        assert!(player.track().is_none());
    }
}
