use std::time::{Duration, Instant};

use crate::engine::timer::PollInterval;
use crate::lyrics::LyricLine;

/// 查找当前播放时间对应的歌词行：最后一个 time <= current_time 的行
///
/// 时间早于第一行（或为 NaN）时返回 None。
pub fn resolve_index(lines: &[LyricLine], current_time: f64) -> Option<usize> {
    let mut found = None;
    for (i, line) in lines.iter().enumerate() {
        if line.time <= current_time {
            found = Some(i);
        } else {
            break;
        }
    }
    found
}

/// 一次轮询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerTick {
    /// 未到轮询时间或未在轮询
    Idle,
    /// 已轮询，行号未变化
    Unchanged,
    /// 已轮询，行号变化
    Changed(Option<usize>),
}

/// 按固定间隔轮询播放时间，映射到歌词行号
#[derive(Debug, Clone)]
pub struct PlaybackTimeTracker {
    interval: PollInterval,
    last_index: Option<usize>,
}

impl PlaybackTimeTracker {
    pub fn new(period: Duration) -> Self {
        Self {
            interval: PollInterval::new(period),
            last_index: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.interval.start(now);
    }

    pub fn stop(&mut self) {
        self.interval.stop();
    }

    pub fn is_polling(&self) -> bool {
        self.interval.is_running()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// 清除轮询和上次结果
    pub fn reset(&mut self) {
        self.interval.stop();
        self.last_index = None;
    }

    /// 到期时读取播放时间并解析行号
    pub fn poll(&mut self, now: Instant, current_time: f64, lines: &[LyricLine]) -> TrackerTick {
        if !self.interval.due(now) {
            return TrackerTick::Idle;
        }
        self.sync(current_time, lines)
    }

    /// 立即解析（跳转等场景不等待下一个周期）
    pub fn sync(&mut self, current_time: f64, lines: &[LyricLine]) -> TrackerTick {
        let index = resolve_index(lines, current_time);
        if index == self.last_index {
            TrackerTick::Unchanged
        } else {
            self.last_index = index;
            TrackerTick::Changed(index)
        }
    }
}
