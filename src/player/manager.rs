use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info, warn};

use crate::config::{Config, PlayerSettings};
use crate::engine::{LoadTicket, PlayerSession};
use crate::error::{PlayerError, Result};
use crate::lyrics::{Lyrics, LyricsResolver};
use crate::player::{
    load_track, ClockTransport, LoadedTrack, MetadataSource, PlayerEvent, TrackInfo, Transport,
};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// 播放器
/// 负责曲目加载、传输控制，并把播放时间转交给歌词会话
pub struct Player {
    settings: PlayerSettings,
    session: PlayerSession,
    transport: Option<Box<dyn Transport>>,
    status: PlaybackStatus,
    track: Option<TrackInfo>,
    lyrics_source: Option<String>,
    pending: Option<LoadTicket>,
    metadata: Arc<dyn MetadataSource>,
    resolver: LyricsResolver,
    event_sender: Option<Sender<PlayerEvent>>,
}

impl Player {
    pub fn new(
        config: &Config,
        metadata: Arc<dyn MetadataSource>,
        resolver: LyricsResolver,
    ) -> Self {
        Self {
            settings: config.player.clone(),
            session: PlayerSession::from_config(config),
            transport: None,
            status: PlaybackStatus::Stopped,
            track: None,
            lyrics_source: None,
            pending: None,
            metadata,
            resolver,
            event_sender: None,
        }
    }

    /// 设置事件发送器，后台加载结果通过它送回
    pub fn set_event_sender(&mut self, sender: Sender<PlayerEvent>) {
        self.event_sender = Some(sender);
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PlayerSession {
        &mut self.session
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn track(&self) -> Option<&TrackInfo> {
        self.track.as_ref()
    }

    pub fn lyrics_source(&self) -> Option<&str> {
        self.lyrics_source.as_deref()
    }

    /// 已启用的歌词来源，按查找顺序
    pub fn lyrics_sources(&self) -> Vec<&str> {
        self.resolver.provider_names()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn position(&self) -> f64 {
        self.transport.as_ref().map_or(0.0, |t| t.current_time())
    }

    pub fn duration(&self) -> f64 {
        self.transport.as_ref().map_or(0.0, |t| t.duration())
    }

    /// 播放进度 0..=1，时长未知时为 0
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration > 0.0 {
            (self.position() / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn volume(&self) -> f32 {
        self.transport
            .as_ref()
            .map_or(self.settings.initial_volume, |t| t.volume())
    }

    /// 加载曲目：立即清空旧状态，后台读取标签和歌词
    pub fn load(&mut self, path: PathBuf) -> LoadTicket {
        let ticket = self.begin_load();
        info!("加载曲目 #{}: {:?}", ticket.id(), path);

        let Some(sender) = self.event_sender.clone() else {
            warn!("未设置事件发送器，加载结果将被丢弃");
            return ticket;
        };
        let metadata = Arc::clone(&self.metadata);
        let resolver = self.resolver.clone();

        tokio::spawn(async move {
            let event = match load_track(path.clone(), metadata.as_ref(), &resolver).await {
                Ok(track) => PlayerEvent::TrackLoaded {
                    ticket,
                    track: Box::new(track),
                },
                Err(e) => PlayerEvent::LoadFailed {
                    ticket,
                    path,
                    error: e.to_string(),
                },
            };
            if let Err(e) = sender.send(event).await {
                debug!("加载结果无人接收: {}", e);
            }
        });

        ticket
    }

    /// 同步清理当前曲目，返回新的加载凭据
    pub fn begin_load(&mut self) -> LoadTicket {
        if let Some(mut transport) = self.transport.take() {
            transport.pause();
        }
        self.status = PlaybackStatus::Stopped;
        self.track = None;
        self.lyrics_source = None;

        let ticket = self.session.begin_load();
        self.pending = Some(ticket);
        ticket
    }

    /// 处理后台事件，返回是否需要重绘
    pub fn handle_event(&mut self, event: PlayerEvent, now: Instant) -> bool {
        match event {
            PlayerEvent::TrackLoaded { ticket, track } => self.finish_load(ticket, *track, now),
            PlayerEvent::LoadFailed {
                ticket,
                path,
                error,
            } => {
                if !self.session.is_current(ticket) {
                    debug!("忽略过期的加载失败 #{}", ticket.id());
                    return false;
                }
                error!("加载 {:?} 失败: {}", path, error);
                self.pending = None;
                true
            }
        }
    }

    /// 应用加载结果，使用系统时钟传输
    pub fn finish_load(&mut self, ticket: LoadTicket, track: LoadedTrack, now: Instant) -> bool {
        let transport = ClockTransport::new(track.info.duration_secs);
        self.finish_load_with(ticket, track, Box::new(transport), now)
    }

    pub fn finish_load_with(
        &mut self,
        ticket: LoadTicket,
        track: LoadedTrack,
        mut transport: Box<dyn Transport>,
        now: Instant,
    ) -> bool {
        let (lyrics, source) = match track.lyrics {
            Some(resolved) => (resolved.lyrics, Some(resolved.source)),
            None => (Lyrics::default(), None),
        };
        if !self.session.apply_lyrics(ticket, lyrics) {
            return false;
        }

        transport.set_volume(self.settings.initial_volume);
        info!(
            "曲目就绪: {} - {}",
            track.info.artist.as_deref().unwrap_or("未知艺术家"),
            track.info.title
        );

        self.transport = Some(transport);
        self.track = Some(track.info);
        self.lyrics_source = source;
        self.pending = None;
        self.status = PlaybackStatus::Paused;

        if self.settings.autoplay {
            if let Err(e) = self.play(now) {
                warn!("自动播放失败: {}", e);
            }
        }
        self.session.sync_to(self.position());
        true
    }

    fn transport_mut(&mut self) -> Result<&mut Box<dyn Transport>> {
        self.transport.as_mut().ok_or(PlayerError::NoTrack)
    }

    pub fn play(&mut self, now: Instant) -> Result<()> {
        self.transport_mut()?.play();
        self.status = PlaybackStatus::Playing;
        self.session.start_polling(now);
        self.session.sync_to(self.position());
        debug!("开始播放");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.transport_mut()?.pause();
        self.status = PlaybackStatus::Paused;
        self.session.stop_polling();
        debug!("暂停播放");
        Ok(())
    }

    pub fn toggle_play(&mut self, now: Instant) -> Result<()> {
        match self.status {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused | PlaybackStatus::Stopped => self.play(now),
        }
    }

    /// 跳转后立即同步实际播放行
    pub fn seek(&mut self, secs: f64) -> Result<()> {
        let transport = self.transport_mut()?;
        transport.seek(secs);
        let position = transport.current_time();
        debug!("跳转到 {:.2}s", position);
        self.session.sync_to(position);
        Ok(())
    }

    pub fn seek_by(&mut self, delta: f64) -> Result<()> {
        let target = self.position() + delta;
        self.seek(target.max(0.0))
    }

    /// 按进度比例跳转（进度条点击）
    pub fn seek_fraction(&mut self, fraction: f64) -> Result<()> {
        let duration = self.duration();
        if duration <= 0.0 {
            return Ok(());
        }
        self.seek(fraction.clamp(0.0, 1.0) * duration)
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.transport_mut()?.set_volume(volume.clamp(0.0, 1.0));
        Ok(())
    }

    pub fn adjust_volume(&mut self, delta: f32) -> Result<()> {
        let volume = self.volume() + delta;
        self.set_volume(volume)
    }

    /// 点击歌词行，手动滚动模式下跳转到该行，返回是否发生跳转
    pub fn click_line(&mut self, index: usize) -> Result<bool> {
        match self.session.click_line(index) {
            Some(time) => {
                self.seek(time)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 定时驱动，返回是否需要重绘
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut redraw = false;
        if self.transport.as_mut().is_some_and(|t| t.take_ended()) {
            self.on_ended();
            redraw = true;
        }

        let position = self.position();
        redraw | self.session.tick(now, position)
    }

    /// 播放结束：停止并回到开头，歌词锚点保持不动
    fn on_ended(&mut self) {
        info!("播放结束");
        self.status = PlaybackStatus::Stopped;
        self.session.stop_polling();
        if let Some(transport) = self.transport.as_mut() {
            transport.seek(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::engine::ScrollMode;
    use crate::lyrics::providers::{FileProvider, LyricsProvider};
    use crate::lyrics::ResolvedLyrics;
    use crate::player::TrackTags;

    #[derive(Default)]
    struct Clock {
        time: f64,
        playing: bool,
        ended: bool,
        volume: f32,
    }

    /// 由测试手动推进时间的传输
    struct ManualTransport {
        clock: Arc<Mutex<Clock>>,
        duration: f64,
    }

    impl Transport for ManualTransport {
        fn current_time(&self) -> f64 {
            self.clock.lock().unwrap().time
        }
        fn duration(&self) -> f64 {
            self.duration
        }
        fn play(&mut self) {
            self.clock.lock().unwrap().playing = true;
        }
        fn pause(&mut self) {
            self.clock.lock().unwrap().playing = false;
        }
        fn seek(&mut self, secs: f64) {
            self.clock.lock().unwrap().time = secs.clamp(0.0, self.duration);
        }
        fn volume(&self) -> f32 {
            self.clock.lock().unwrap().volume
        }
        fn set_volume(&mut self, volume: f32) {
            self.clock.lock().unwrap().volume = volume;
        }
        fn is_playing(&self) -> bool {
            self.clock.lock().unwrap().playing
        }
        fn take_ended(&mut self) -> bool {
            let mut clock = self.clock.lock().unwrap();
            if clock.ended {
                clock.ended = false;
                clock.playing = false;
                true
            } else {
                false
            }
        }
    }

    struct NoTags;

    #[async_trait]
    impl MetadataSource for NoTags {
        async fn read_tags(&self, path: &Path) -> Result<TrackTags> {
            Err(PlayerError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "no tags"),
            ))
        }
    }

    const LRC: &str = "[00:00.00]一\n[00:05.00]二\n[00:10.00]三\n[00:15.00]四";

    fn player() -> Player {
        Player::new(&Config::default(), Arc::new(NoTags), LyricsResolver::new(vec![]))
    }

    fn track(title: &str, lrc: Option<&str>) -> LoadedTrack {
        LoadedTrack {
            info: TrackInfo {
                path: PathBuf::from(format!("/music/{title}.mp3")),
                title: title.to_string(),
                artist: None,
                cover: None,
                duration_secs: 20.0,
            },
            lyrics: lrc.map(|text| ResolvedLyrics {
                lyrics: Lyrics::from_lrc(text, "test"),
                source: "test".into(),
            }),
        }
    }

    fn loaded(now: Instant) -> (Player, Arc<Mutex<Clock>>) {
        let mut p = player();
        let clock = Arc::new(Mutex::new(Clock::default()));
        let ticket = p.begin_load();
        let transport = ManualTransport {
            clock: Arc::clone(&clock),
            duration: 20.0,
        };
        assert!(p.finish_load_with(ticket, track("a", Some(LRC)), Box::new(transport), now));
        (p, clock)
    }

    #[test]
    fn test_commands_without_track() {
        let mut p = player();
        assert!(matches!(p.seek(3.0), Err(PlayerError::NoTrack)));
        assert!(matches!(p.toggle_play(Instant::now()), Err(PlayerError::NoTrack)));
        assert_eq!(p.progress(), 0.0);
    }

    #[test]
    fn test_autoplay_and_polling() {
        let start = Instant::now();
        let (mut p, clock) = loaded(start);
        assert_eq!(p.status(), PlaybackStatus::Playing);
        assert_eq!(p.session().actual_index(), Some(0));
        assert_eq!(clock.lock().unwrap().volume, 1.0);

        clock.lock().unwrap().time = 6.0;
        assert!(p.tick(start + Duration::from_millis(100)));
        assert_eq!(p.session().actual_index(), Some(1));
        assert_eq!(p.session().current_index(), Some(1));
        assert!((p.progress() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_pause_stops_polling() {
        let start = Instant::now();
        let (mut p, clock) = loaded(start);
        p.toggle_play(start).unwrap();
        assert_eq!(p.status(), PlaybackStatus::Paused);
        assert!(!p.session().is_polling());

        clock.lock().unwrap().time = 11.0;
        p.tick(start + Duration::from_millis(100));
        assert_eq!(p.session().actual_index(), Some(0));
    }

    #[test]
    fn test_seek_syncs_immediately() {
        let start = Instant::now();
        let (mut p, _clock) = loaded(start);
        p.seek(10.5).unwrap();
        assert_eq!(p.session().actual_index(), Some(2));

        p.seek_fraction(0.0).unwrap();
        assert_eq!(p.session().actual_index(), Some(0));

        p.seek_by(-3.0).unwrap();
        assert_eq!(p.position(), 0.0);
    }

    #[test]
    fn test_click_line_only_in_manual_mode() {
        let start = Instant::now();
        let (mut p, clock) = loaded(start);
        assert!(!p.click_line(3).unwrap());

        p.session_mut().wheel(60.0, start);
        assert_eq!(p.session().mode(), ScrollMode::ManualScroll);
        assert!(p.click_line(3).unwrap());
        assert_eq!(clock.lock().unwrap().time, 15.0);
        assert_eq!(p.session().actual_index(), Some(3));
    }

    #[test]
    fn test_ended_keeps_anchor() {
        let start = Instant::now();
        let (mut p, clock) = loaded(start);
        p.seek(16.0).unwrap();
        assert_eq!(p.session().current_index(), Some(3));

        clock.lock().unwrap().ended = true;
        assert!(p.tick(start + Duration::from_millis(100)));
        assert_eq!(p.status(), PlaybackStatus::Stopped);
        assert_eq!(p.position(), 0.0);
        assert!(!p.session().is_polling());
        assert_eq!(p.session().current_index(), Some(3));
    }

    #[test]
    fn test_volume_clamped() {
        let start = Instant::now();
        let (mut p, _clock) = loaded(start);
        p.adjust_volume(0.5).unwrap();
        assert_eq!(p.volume(), 1.0);
        p.set_volume(-1.0).unwrap();
        assert_eq!(p.volume(), 0.0);
    }

    #[test]
    fn test_stale_track_discarded() {
        let start = Instant::now();
        let mut p = player();
        let first = p.begin_load();
        let second = p.begin_load();

        assert!(!p.finish_load(first, track("旧", Some(LRC)), start));
        assert!(p.track().is_none());
        assert!(p.is_loading());

        assert!(p.finish_load(second, track("新", None), start));
        assert_eq!(p.track().unwrap().title, "新");
        assert!(p.session().lines().is_empty());
        assert!(p.lyrics_source().is_none());
    }

    #[tokio::test]
    async fn test_background_load_with_lrc_override() {
        let dir = std::env::temp_dir().join(format!("lyric-stage-player-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let audio = dir.join("song.mp3");
        let lrc = dir.join("song-override.lrc");
        std::fs::write(&audio, b"audio").unwrap();
        std::fs::write(&lrc, LRC).unwrap();

        let providers: Vec<Arc<dyn LyricsProvider>> = vec![Arc::new(FileProvider::new(lrc))];
        let mut p = Player::new(&Config::default(), Arc::new(NoTags), LyricsResolver::new(providers));
        let (tx, mut rx) = mpsc::channel(4);
        p.set_event_sender(tx);

        let ticket = p.load(audio);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.ticket(), ticket);

        assert!(p.handle_event(event, Instant::now()));
        assert_eq!(p.track().unwrap().title, "song");
        assert_eq!(p.session().lines().len(), 4);
        assert_eq!(p.lyrics_source(), Some("file"));
    }

    #[tokio::test]
    async fn test_background_load_failure() {
        let mut p = player();
        let (tx, mut rx) = mpsc::channel(4);
        p.set_event_sender(tx);

        p.load(PathBuf::from("/nonexistent/lyric-stage/none.mp3"));
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, PlayerEvent::LoadFailed { .. }));
        assert!(p.handle_event(event, Instant::now()));
        assert!(!p.is_loading());
        assert!(p.track().is_none());
    }
}
