use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::layout::{LayoutCache, LayoutMetrics};
use crate::engine::positioner::{Positioner, RenderFrame};
use crate::engine::scroll::{ScrollModeController, ScrollState};
use crate::engine::tracker::{PlaybackTimeTracker, TrackerTick};
use crate::engine::{LyricsView, ScrollMode};
use crate::lyrics::{LyricLine, Lyrics};

/// 一次加载请求的凭据，只有最新的凭据才能把歌词写入会话
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// 单个播放会话：持有当前曲目的歌词、排版缓存和滚动状态
#[derive(Debug)]
pub struct PlayerSession {
    metrics: LayoutMetrics,
    lyrics: Lyrics,
    layout: Option<LayoutCache>,
    controller: ScrollModeController,
    tracker: PlaybackTimeTracker,
    generation: u64,
    needs_render: bool,
}

impl PlayerSession {
    pub fn new(metrics: LayoutMetrics, poll_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            metrics,
            lyrics: Lyrics::default(),
            layout: None,
            controller: ScrollModeController::new(idle_timeout),
            tracker: PlaybackTimeTracker::new(poll_interval),
            generation: 0,
            needs_render: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.layout.clone(),
            config.engine.poll_interval(),
            config.engine.idle_timeout(),
        )
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn lyrics(&self) -> &Lyrics {
        &self.lyrics
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lyrics.lines
    }

    pub fn mode(&self) -> ScrollMode {
        self.controller.mode()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.controller.current_index()
    }

    pub fn actual_index(&self) -> Option<usize> {
        self.controller.actual_index()
    }

    pub fn actual_line(&self) -> Option<&LyricLine> {
        self.actual_index().and_then(|i| self.lyrics.lines.get(i))
    }

    pub fn scroll_state(&self, now: Instant) -> ScrollState {
        self.controller.state(now)
    }

    pub fn has_layout(&self) -> bool {
        self.layout.is_some()
    }

    /// 开始加载新曲目
    ///
    /// 立即清空排版缓存、空闲计时、轮询和两个行号，之前发出的凭据全部作废。
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.lyrics = Lyrics::default();
        self.layout = None;
        self.controller.reset();
        self.tracker.reset();
        self.needs_render = true;

        debug!("开始加载曲目 #{}", self.generation);
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// 写入加载完成的歌词，凭据过期时丢弃并返回 false
    pub fn apply_lyrics(&mut self, ticket: LoadTicket, lyrics: Lyrics) -> bool {
        if !self.is_current(ticket) {
            warn!(
                "丢弃过期的歌词加载结果 #{} (当前 #{})",
                ticket.0, self.generation
            );
            return false;
        }

        info!(
            "歌词已就绪: 来源 {}, 共{}行",
            if lyrics.metadata.source.is_empty() {
                "无"
            } else {
                &lyrics.metadata.source
            },
            lyrics.lines.len()
        );

        self.lyrics = lyrics;
        self.layout = None;
        self.controller.reset();
        self.tracker.reset();
        self.needs_render = true;
        true
    }

    pub fn start_polling(&mut self, now: Instant) {
        self.tracker.start(now);
    }

    pub fn stop_polling(&mut self) {
        self.tracker.stop();
    }

    pub fn is_polling(&self) -> bool {
        self.tracker.is_polling()
    }

    /// 定时驱动：检查空闲计时并按轮询间隔读取播放时间，返回是否需要重绘
    pub fn tick(&mut self, now: Instant, playback_time: f64) -> bool {
        let mut redraw = self.controller.poll(now);

        if let TrackerTick::Changed(index) =
            self.tracker.poll(now, playback_time, &self.lyrics.lines)
        {
            redraw |= self.controller.set_actual(index);
        }

        self.needs_render |= redraw;
        redraw
    }

    /// 立即按给定时间同步实际播放行（用于跳转）
    pub fn sync_to(&mut self, playback_time: f64) -> bool {
        let redraw = match self.tracker.sync(playback_time, &self.lyrics.lines) {
            TrackerTick::Changed(index) => self.controller.set_actual(index),
            _ => false,
        };
        self.needs_render |= redraw;
        redraw
    }

    pub fn wheel(&mut self, delta_y: f64, now: Instant) -> bool {
        let redraw = self.controller.on_wheel(delta_y, self.lyrics.lines.len(), now);
        self.needs_render |= redraw;
        redraw
    }

    pub fn pointer_enter(&mut self) {
        self.controller.on_pointer_enter();
    }

    pub fn pointer_leave(&mut self) -> bool {
        let redraw = self.controller.on_pointer_leave();
        self.needs_render |= redraw;
        redraw
    }

    pub fn is_hovering(&self) -> bool {
        self.controller.is_hovering()
    }

    /// 点击歌词行：仅在手动滚动模式下返回跳转目标时间
    pub fn click_line(&self, index: usize) -> Option<f64> {
        if !self.controller.is_scrolling() {
            return None;
        }
        self.lyrics.lines.get(index).map(|line| line.time)
    }

    /// 显式重置排版缓存，下次渲染时重新测量
    pub fn reset_layout(&mut self) {
        self.layout = None;
        self.needs_render = true;
    }

    /// 取出并清除待重绘标记
    pub fn take_needs_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    /// 计算当前渲染结果，首次调用时用 `measure` 测量每行高度
    pub fn frame<F>(&mut self, measure: F) -> RenderFrame
    where
        F: FnMut(usize, &LyricLine) -> f32,
    {
        let cache = self
            .layout
            .get_or_insert_with(|| LayoutCache::measure(&self.lyrics.lines, &self.metrics, measure));

        Positioner::new(&self.metrics).frame(
            self.controller.mode(),
            self.controller.current_index(),
            self.controller.actual_index(),
            cache,
        )
    }

    /// 通过视图测量并应用一次渲染
    pub fn render<V: LyricsView>(&mut self, view: &mut V) -> RenderFrame {
        let base_font = self.metrics.base_font_size;
        let frame = self.frame(|index, line| view.natural_height(index, line, base_font));
        view.apply(&self.lyrics.lines, &frame);
        self.needs_render = false;
        frame
    }
}
