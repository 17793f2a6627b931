use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lyrics::LyricLine;

/// 歌词排版参数（像素）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// 锚点行的起始位置
    pub start_offset: f32,
    /// 自动跟随模式行间距
    pub line_spacing: f32,
    /// 手动滚动模式行间距
    pub scroll_line_spacing: f32,
    /// 单行基础行高，超过即视为换行歌词
    pub base_line_height: f32,
    /// 测量时使用的基础字号
    pub base_font_size: f32,
    /// 锚点前后最多显示的行数
    pub max_visible: usize,
    /// 最多保留的已播放行数
    pub max_past: usize,
    /// 隐藏行的模糊半径
    pub hidden_blur: f32,
    /// 每行距离增加的模糊半径
    pub blur_step: f32,
    pub active_font_size: f32,
    pub wrapping_font_size: f32,
    pub past_font_size: f32,
    /// 距离 1 / 2 / 3 的字号
    pub near_font_sizes: [f32; 3],
    pub far_font_size: f32,
    pub scroll_font_size: f32,
    pub inactive_opacity: f32,
    pub scroll_inactive_opacity: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            start_offset: 30.0,
            line_spacing: 120.0,
            scroll_line_spacing: 100.0,
            base_line_height: 90.0,
            base_font_size: 54.0,
            max_visible: 3,
            max_past: 1,
            hidden_blur: 10.0,
            blur_step: 1.5,
            active_font_size: 56.0,
            wrapping_font_size: 54.0,
            past_font_size: 54.0,
            near_font_sizes: [52.0, 48.0, 44.0],
            far_font_size: 50.0,
            scroll_font_size: 56.0,
            inactive_opacity: 0.5,
            scroll_inactive_opacity: 0.7,
        }
    }
}

/// 单行的测量结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    pub height: f32,
    pub wrapping: bool,
}

/// 每首歌只测量一次的排版缓存
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCache {
    lines: Vec<LineLayout>,
    /// 每行之前所有换行歌词带来的额外高度
    cumulative: Vec<f32>,
}

impl LayoutCache {
    /// 用给定的测量函数收集每行自然高度，再计算累积偏移
    pub fn measure<F>(lines: &[LyricLine], metrics: &LayoutMetrics, mut measure: F) -> Self
    where
        F: FnMut(usize, &LyricLine) -> f32,
    {
        let heights: Vec<f32> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| measure(i, line))
            .collect();

        let cache = Self::from_heights(&heights, metrics.base_line_height);
        debug!(
            "歌词排版测量完成: 共{}行, 换行{}行",
            cache.len(),
            cache.lines.iter().filter(|l| l.wrapping).count()
        );
        cache
    }

    /// 由已测量的高度构建缓存
    pub fn from_heights(heights: &[f32], base_line_height: f32) -> Self {
        let mut lines = Vec::with_capacity(heights.len());
        let mut cumulative = Vec::with_capacity(heights.len());
        let mut offset = 0.0;

        for &height in heights {
            let wrapping = height > base_line_height;
            cumulative.push(offset);
            if wrapping {
                offset += height - base_line_height;
            }
            lines.push(LineLayout { height, wrapping });
        }

        Self { lines, cumulative }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&LineLayout> {
        self.lines.get(index)
    }

    pub fn is_wrapping(&self, index: usize) -> bool {
        self.lines.get(index).is_some_and(|l| l.wrapping)
    }

    /// 第 index 行的累积偏移，越界时为 0
    pub fn cumulative_offset(&self, index: usize) -> f32 {
        self.cumulative.get(index).copied().unwrap_or(0.0)
    }
}
