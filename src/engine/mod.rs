// 歌词同步引擎
// 解析后的歌词 -> 排版测量 -> 位置计算，中间由滚动模式仲裁锚点

mod layout;
mod positioner;
mod scroll;
mod session;
mod timer;
mod tracker;

use serde::Serialize;

use crate::lyrics::LyricLine;

pub use layout::{LayoutCache, LayoutMetrics, LineLayout};
pub use positioner::{LineStyle, Positioner, RenderFrame};
pub use scroll::{ScrollModeController, ScrollState};
pub use session::{LoadTicket, PlayerSession};
pub use timer::{PollInterval, ScheduledTask};
pub use tracker::{resolve_index, PlaybackTimeTracker, TrackerTick};

/// 歌词显示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScrollMode {
    /// 锚点跟随播放时间
    AutoFollow,
    /// 锚点跟随用户滚动
    ManualScroll,
}

/// 宿主渲染表面
pub trait LyricsView {
    /// 以给定字号测量一行歌词的自然高度（像素）
    fn natural_height(&mut self, index: usize, line: &LyricLine, font_size: f32) -> f32;

    /// 应用一次渲染结果
    fn apply(&mut self, lyrics: &[LyricLine], frame: &RenderFrame);
}
