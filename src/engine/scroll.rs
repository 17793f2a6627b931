use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::timer::ScheduledTask;
use crate::engine::ScrollMode;

/// 滚动状态快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub is_scrolling: bool,
    pub since_last_scroll: Option<Duration>,
    pub idle_timer_pending: bool,
}

/// 自动跟随 / 手动滚动两种模式的仲裁器
///
/// `current` 是渲染使用的锚点，`actual` 是播放时间对应的行。
/// 自动跟随时两者始终相等；手动滚动时 `actual` 仍在后台更新。
#[derive(Debug, Clone)]
pub struct ScrollModeController {
    mode: ScrollMode,
    current: Option<usize>,
    actual: Option<usize>,
    hovering: bool,
    last_scroll: Option<Instant>,
    idle_timer: ScheduledTask,
    idle_timeout: Duration,
}

impl ScrollModeController {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            mode: ScrollMode::AutoFollow,
            current: None,
            actual: None,
            hovering: false,
            last_scroll: None,
            idle_timer: ScheduledTask::new(),
            idle_timeout,
        }
    }

    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub fn is_scrolling(&self) -> bool {
        self.mode == ScrollMode::ManualScroll
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn actual_index(&self) -> Option<usize> {
        self.actual
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn state(&self, now: Instant) -> ScrollState {
        ScrollState {
            is_scrolling: self.is_scrolling(),
            since_last_scroll: self
                .last_scroll
                .map(|at| now.saturating_duration_since(at)),
            idle_timer_pending: self.idle_timer.is_pending(),
        }
    }

    /// 回到初始状态（新曲目加载时调用）
    pub fn reset(&mut self) {
        self.mode = ScrollMode::AutoFollow;
        self.current = None;
        self.actual = None;
        self.last_scroll = None;
        self.idle_timer.cancel();
    }

    /// 处理一次滚轮输入，返回锚点是否需要重绘
    pub fn on_wheel(&mut self, delta_y: f64, line_count: usize, now: Instant) -> bool {
        if line_count == 0 {
            return false;
        }

        if self.mode == ScrollMode::AutoFollow {
            debug!("进入手动滚动模式");
        }
        self.mode = ScrollMode::ManualScroll;
        self.last_scroll = Some(now);
        self.idle_timer.schedule(now + self.idle_timeout);

        let step = Self::scroll_step(delta_y);
        let from = self.current.map_or(-1, |i| i as i64);
        let max = line_count as i64 - 1;
        let to = from.saturating_add(step).clamp(0, max) as usize;

        debug!("歌词滚动: {} -> {}", from, to);
        self.current = Some(to);
        true
    }

    /// 滚动行数：方向乘以 floor(|deltaY| / 100) + 1
    pub fn scroll_step(delta_y: f64) -> i64 {
        if delta_y == 0.0 || delta_y.is_nan() {
            return 0;
        }
        // 浮点转整数饱和，超大或无穷的 deltaY 也不会溢出
        let lines = ((delta_y.abs() / 100.0).floor() as i64).saturating_add(1);
        if delta_y < 0.0 {
            -lines
        } else {
            lines
        }
    }

    /// 指针进入歌词区域：暂停空闲计时
    pub fn on_pointer_enter(&mut self) {
        self.hovering = true;
        if self.idle_timer.cancel() {
            debug!("指针进入歌词区域，暂停空闲计时");
        }
    }

    /// 指针离开歌词区域：立即回到自动跟随
    pub fn on_pointer_leave(&mut self) -> bool {
        self.hovering = false;
        self.return_to_auto()
    }

    /// 检查空闲计时是否到期，到期则回到自动跟随
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.idle_timer.fire(now) {
            debug!("{:?} 内无滚动操作，恢复自动跟随", self.idle_timeout);
            return self.return_to_auto();
        }
        false
    }

    /// 切回自动跟随并把锚点对齐到实际播放行，返回是否需要重绘
    pub fn return_to_auto(&mut self) -> bool {
        let was_scrolling = self.is_scrolling();
        let changed = self.current != self.actual;

        self.mode = ScrollMode::AutoFollow;
        self.idle_timer.cancel();
        self.current = self.actual;

        if was_scrolling {
            debug!("退出手动滚动模式，锚点回到 {:?}", self.actual);
        }
        was_scrolling || changed
    }

    /// 更新实际播放行，返回是否需要重绘
    pub fn set_actual(&mut self, index: Option<usize>) -> bool {
        if self.actual == index {
            return false;
        }
        self.actual = index;

        match self.mode {
            ScrollMode::AutoFollow => {
                self.current = index;
                true
            }
            // 只更新实际播放行标记，不移动锚点
            ScrollMode::ManualScroll => true,
        }
    }
}
