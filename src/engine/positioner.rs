use serde::Serialize;

use crate::engine::layout::{LayoutCache, LayoutMetrics};
use crate::engine::ScrollMode;

/// 单行歌词在一次渲染中的样式
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub index: usize,
    /// 纵向偏移（像素）
    pub offset_y: f32,
    pub opacity: f32,
    /// 模糊半径（像素）
    pub blur: f32,
    pub font_size: f32,
    pub active: bool,
    pub past: bool,
    pub wrapping: bool,
    /// 手动滚动时标记实际播放行
    pub playing_marker: bool,
}

impl LineStyle {
    pub fn is_hidden(&self) -> bool {
        self.opacity <= 0.0
    }
}

/// 一次完整的渲染结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub mode: ScrollMode,
    pub anchor: Option<usize>,
    pub actual: Option<usize>,
    pub lines: Vec<LineStyle>,
}

/// 根据锚点和排版缓存计算每行的位置与样式，纯函数，无内部状态
pub struct Positioner<'a> {
    metrics: &'a LayoutMetrics,
}

impl<'a> Positioner<'a> {
    pub fn new(metrics: &'a LayoutMetrics) -> Self {
        Self { metrics }
    }

    pub fn frame(
        &self,
        mode: ScrollMode,
        anchor: Option<usize>,
        actual: Option<usize>,
        cache: &LayoutCache,
    ) -> RenderFrame {
        let lines = match mode {
            ScrollMode::AutoFollow => self.auto_follow(anchor, cache),
            ScrollMode::ManualScroll => self.manual_scroll(anchor, actual, cache),
        };

        RenderFrame {
            mode,
            anchor,
            actual,
            lines,
        }
    }

    /// 自动跟随排版：锚点行固定在起始位置，换行歌词把后续行向下推
    pub fn auto_follow(&self, anchor: Option<usize>, cache: &LayoutCache) -> Vec<LineStyle> {
        let m = self.metrics;
        // 尚无歌词行命中时锚点为 -1
        let anchor_pos = anchor.map_or(-1, |i| i as i64);
        let anchor_offset = anchor.map_or(0.0, |i| cache.cumulative_offset(i));

        (0..cache.len())
            .map(|index| {
                let distance = index as i64 - anchor_pos;
                let wrapping = cache.is_wrapping(index);
                let offset_y = m.start_offset
                    + distance as f32 * m.line_spacing
                    + cache.cumulative_offset(index)
                    - anchor_offset;

                let hidden = distance < -(m.max_past as i64)
                    || distance.unsigned_abs() > m.max_visible as u64;

                let mut style = LineStyle {
                    index,
                    offset_y,
                    opacity: m.inactive_opacity,
                    blur: distance.unsigned_abs() as f32 * m.blur_step,
                    font_size: self.distance_font_size(distance, wrapping),
                    active: distance == 0,
                    past: distance < 0,
                    wrapping,
                    playing_marker: false,
                };

                if hidden {
                    // 仍然定位，锚点回退时可以平滑淡入
                    style.opacity = 0.0;
                    style.blur = m.hidden_blur;
                } else if distance == 0 {
                    style.opacity = 1.0;
                    style.blur = 0.0;
                }

                style
            })
            .collect()
    }

    fn distance_font_size(&self, distance: i64, wrapping: bool) -> f32 {
        let m = self.metrics;
        if distance == 0 {
            return if wrapping {
                m.wrapping_font_size
            } else {
                m.active_font_size
            };
        }
        if distance < 0 {
            return m.past_font_size;
        }
        if wrapping {
            return m.wrapping_font_size;
        }
        match distance {
            1..=3 => m.near_font_sizes[distance as usize - 1],
            _ => m.far_font_size,
        }
    }

    /// 手动滚动排版：固定行距、统一字号、无模糊
    pub fn manual_scroll(
        &self,
        anchor: Option<usize>,
        actual: Option<usize>,
        cache: &LayoutCache,
    ) -> Vec<LineStyle> {
        let m = self.metrics;
        let anchor_pos = anchor.map_or(-1, |i| i as i64);

        (0..cache.len())
            .map(|index| {
                let distance = index as i64 - anchor_pos;
                let is_anchor = distance == 0;

                LineStyle {
                    index,
                    offset_y: m.start_offset + distance as f32 * m.scroll_line_spacing,
                    opacity: if is_anchor {
                        1.0
                    } else {
                        m.scroll_inactive_opacity
                    },
                    blur: 0.0,
                    font_size: m.scroll_font_size,
                    active: is_anchor,
                    past: actual.is_some_and(|a| index < a),
                    wrapping: cache.is_wrapping(index),
                    playing_marker: actual == Some(index) && !is_anchor,
                }
            })
            .collect()
    }
}
