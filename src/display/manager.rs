use std::io::{self, Write};
use std::time::Instant;

use anyhow::{bail, Result};
use tokio::sync::mpsc::Receiver;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::{Config, DisplayConfig};
use crate::display::formatter::{format_line, LineRecord};
use crate::player::{PlaybackStatus, Player, PlayerEvent};

/// 简单输出：记录上次输出的行号，避免重复输出
#[derive(Debug, Clone)]
pub struct SimpleOutput {
    json: bool,
    show_timestamp: bool,
    /// None 表示尚未输出过
    last_index: Option<Option<usize>>,
}

impl SimpleOutput {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            json: config.json_output,
            show_timestamp: config.show_timestamp,
            last_index: None,
        }
    }

    /// 重新开始（换曲时）
    pub fn reset(&mut self) {
        self.last_index = None;
    }

    /// 实际播放行变化时返回要输出的内容
    pub fn render(&mut self, player: &Player) -> Result<Option<String>> {
        let Some(track) = player.track() else {
            return Ok(None);
        };

        let session = player.session();
        let index = session.actual_index();
        match self.last_index {
            Some(last) if last == index => return Ok(None),
            // 第一行之前不输出空行
            None if index.is_none() => {
                self.last_index = Some(None);
                return Ok(None);
            }
            _ => {}
        }
        self.last_index = Some(index);

        let line = session.actual_line();
        let output = if self.json {
            let record = LineRecord::new(index, line, player.position(), Some(&track.title));
            serde_json::to_string(&record)?
        } else {
            format_line(line, self.show_timestamp)
        };
        Ok(Some(output))
    }
}

/// 运行简单输出模式，直到播放结束或收到 Ctrl+C
pub async fn run_simple_output(
    config: &Config,
    mut player: Player,
    mut events: Receiver<PlayerEvent>,
) -> Result<()> {
    let mut output = SimpleOutput::new(&config.display);
    let mut ticker = time::interval(config.engine.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let was_playing = player.status() == PlaybackStatus::Playing;
                player.tick(Instant::now());
                if was_playing && player.status() == PlaybackStatus::Stopped {
                    info!("播放结束");
                    break;
                }
            }

            Some(event) = events.recv() => {
                if let PlayerEvent::LoadFailed { ticket, path, error } = &event {
                    if player.session().is_current(*ticket) {
                        bail!("加载 {:?} 失败: {}", path, error);
                    }
                }
                if player.handle_event(event, Instant::now()) {
                    output.reset();
                    // 简单模式没有播放控制，加载完成即播放
                    if player.status() != PlaybackStatus::Playing {
                        player.play(Instant::now())?;
                    }
                }
            }

            _ = &mut ctrl_c => {
                debug!("收到 Ctrl+C，退出");
                break;
            }
        }

        if let Some(text) = output.render(&player)? {
            writeln!(stdout, "{}", text)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::lyrics::{Lyrics, LyricsResolver, ResolvedLyrics};
    use crate::player::{LoadedTrack, LoftyMetadata, TrackInfo};

    fn player(lrc: &str) -> Player {
        let mut config = Config::default();
        config.player.autoplay = false;
        let mut player = Player::new(&config, Arc::new(LoftyMetadata), LyricsResolver::new(vec![]));

        let ticket = player.begin_load();
        let track = LoadedTrack {
            info: TrackInfo {
                path: PathBuf::from("/music/稻香.mp3"),
                title: "稻香".into(),
                artist: Some("周杰伦".into()),
                cover: None,
                duration_secs: 60.0,
            },
            lyrics: Some(ResolvedLyrics {
                lyrics: Lyrics::from_lrc(lrc, "test"),
                source: "test".into(),
            }),
        };
        assert!(player.finish_load(ticket, track, Instant::now()));
        player
    }

    fn display(json: bool) -> DisplayConfig {
        DisplayConfig {
            json_output: json,
            ..DisplayConfig::default()
        }
    }

    #[test]
    fn test_prints_only_on_change() {
        let mut p = player("[00:02.00]一\n[00:05.00]二");
        let mut out = SimpleOutput::new(&display(false));

        // 第一行之前什么都不输出
        assert_eq!(out.render(&p).unwrap(), None);

        p.seek(2.5).unwrap();
        assert_eq!(out.render(&p).unwrap().as_deref(), Some("一"));
        assert_eq!(out.render(&p).unwrap(), None);

        p.seek(6.0).unwrap();
        assert_eq!(out.render(&p).unwrap().as_deref(), Some("二"));

        // 回到第一行之前输出空行
        p.seek(0.0).unwrap();
        assert_eq!(out.render(&p).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_json_output() {
        let mut p = player("[00:00.00]周杰伦 - 稻香");
        let mut out = SimpleOutput::new(&display(true));
        p.seek(1.0).unwrap();

        let text = out.render(&p).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["index"], 0);
        assert_eq!(value["text"], "周杰伦 - 稻香");
        assert_eq!(value["title"], "稻香");
    }

    #[test]
    fn test_nothing_without_track() {
        let p = Player::new(&Config::default(), Arc::new(LoftyMetadata), LyricsResolver::new(vec![]));
        let mut out = SimpleOutput::new(&display(false));
        assert_eq!(out.render(&p).unwrap(), None);
    }
}
