use ratatui::{
    layout::{Alignment, Margin, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::engine::{LayoutMetrics, LineStyle, LyricsView, RenderFrame};
use crate::lyrics::LyricLine;
use crate::tui::theme::Theme;

/// 行首标记列宽度
const MARKER_WIDTH: u16 = 2;

/// 已放置到面板上的一行
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub index: usize,
    /// 相对面板内区域顶部的行号，可为负
    pub top: i32,
    pub rows: u16,
    pub style: LineStyle,
}

/// 歌词面板组件
///
/// 把像素坐标按 `px_per_row` 换算为终端行。终端字号固定，
/// 测量只看文本显示宽度折行后的行数。
#[derive(Debug, Clone)]
pub struct LyricsPanel {
    area: Rect,
    inner: Rect,
    px_per_row: f32,
    start_offset: f32,
    base_line_height: f32,
    placed: Vec<PlacedLine>,
}

impl LyricsPanel {
    pub fn new(metrics: &LayoutMetrics, px_per_row: f32) -> Self {
        Self {
            area: Rect::default(),
            inner: Rect::default(),
            px_per_row,
            start_offset: metrics.start_offset,
            base_line_height: metrics.base_line_height,
            placed: Vec::new(),
        }
    }

    /// 设置面板区域（含边框），宽度变化时返回 true，此时需要重新测量
    pub fn set_area(&mut self, area: Rect) -> bool {
        let changed = area.width != self.area.width;
        self.area = area;
        self.inner = area.inner(Margin::new(1, 1));
        changed
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn placed(&self) -> &[PlacedLine] {
        &self.placed
    }

    fn text_width(&self) -> u16 {
        self.inner.width.saturating_sub(MARKER_WIDTH).max(1)
    }

    /// 文本折行后占用的终端行数
    pub fn rows_for(&self, text: &str) -> u16 {
        let width = UnicodeWidthStr::width(text).max(1);
        width.div_ceil(self.text_width() as usize).min(u16::MAX as usize) as u16
    }

    /// 锚点行所在的终端行（面板上三分之一处）
    fn anchor_row(&self) -> i32 {
        i32::from(self.inner.height) / 3
    }

    /// 命中测试：返回坐标处的歌词行号
    pub fn line_at(&self, column: u16, row: u16) -> Option<usize> {
        if !self.inner.contains(Position::new(column, row)) {
            return None;
        }
        let rel = i32::from(row - self.inner.y);
        self.placed
            .iter()
            .filter(|p| !p.style.is_hidden())
            .find(|p| rel >= p.top && rel < p.top + i32::from(p.rows))
            .map(|p| p.index)
    }

    /// 渲染歌词面板
    pub fn render(&self, f: &mut Frame, lyrics: &[LyricLine], theme: &Theme, placeholder: &str) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style());
        f.render_widget(block, self.area);

        if lyrics.is_empty() {
            self.render_placeholder(f, placeholder, theme);
            return;
        }

        let visible: Vec<&PlacedLine> = self.placed.iter().filter(|p| !p.style.is_hidden()).collect();
        let height = i32::from(self.inner.height);

        for (i, placed) in visible.iter().enumerate() {
            if placed.top < 0 || placed.top >= height {
                continue;
            }
            let Some(line) = lyrics.get(placed.index) else {
                continue;
            };

            // 手动滚动时行距固定，换行歌词不能盖住下一行
            let next_top = visible
                .get(i + 1)
                .map_or(height, |next| next.top.min(height));
            let rows = i32::from(placed.rows)
                .min(next_top - placed.top)
                .min(height - placed.top)
                .max(1) as u16;

            let y = self.inner.y + placed.top as u16;
            let marker_rect = Rect::new(self.inner.x, y, MARKER_WIDTH.min(self.inner.width), 1);
            let text_rect = Rect::new(
                self.inner.x + marker_rect.width,
                y,
                self.inner.width.saturating_sub(marker_rect.width),
                rows,
            );

            let marker = if placed.style.active {
                Span::styled("▶ ", theme.current_line_style())
            } else if placed.style.playing_marker {
                Span::styled("▎ ", theme.marker_style())
            } else {
                Span::raw("  ")
            };
            f.render_widget(Paragraph::new(Line::from(marker)), marker_rect);

            let text = Paragraph::new(Line::from(Span::styled(
                line.text.as_str(),
                theme.lyric_style(&placed.style),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });
            f.render_widget(text, text_rect);
        }
    }

    fn render_placeholder(&self, f: &mut Frame, message: &str, theme: &Theme) {
        if self.inner.height == 0 {
            return;
        }
        let rect = Rect::new(
            self.inner.x,
            self.inner.y + self.inner.height / 2,
            self.inner.width,
            1,
        );
        let paragraph = Paragraph::new(Span::styled(message.to_string(), theme.status_style()))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, rect);
    }
}

impl LyricsView for LyricsPanel {
    fn natural_height(&mut self, _index: usize, line: &LyricLine, _font_size: f32) -> f32 {
        // 单行文本恰好等于基准行高，多出的每一行按 px_per_row 计
        let extra_rows = self.rows_for(&line.text).saturating_sub(1);
        self.base_line_height + f32::from(extra_rows) * self.px_per_row
    }

    fn apply(&mut self, lyrics: &[LyricLine], frame: &RenderFrame) {
        let anchor_row = self.anchor_row();
        self.placed = frame
            .lines
            .iter()
            .map(|style| {
                let rows = lyrics
                    .get(style.index)
                    .map_or(1, |line| self.rows_for(&line.text));
                let top =
                    anchor_row + ((style.offset_y - self.start_offset) / self.px_per_row).round() as i32;
                PlacedLine {
                    index: style.index,
                    top,
                    rows,
                    style: style.clone(),
                }
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::PlayerSession;
    use crate::lyrics::Lyrics;

    fn panel(width: u16, height: u16) -> LyricsPanel {
        let mut panel = LyricsPanel::new(&LayoutMetrics::default(), 40.0);
        panel.set_area(Rect::new(0, 0, width, height));
        panel
    }

    fn line(text: &str) -> LyricLine {
        LyricLine {
            time: 0.0,
            text: text.into(),
        }
    }

    #[test]
    fn test_natural_height_counts_wrapped_rows() {
        // 内区宽 12，去掉标记列后 10 列
        let mut p = panel(14, 20);
        assert_eq!(p.rows_for("hello"), 1);
        assert_eq!(p.natural_height(0, &line("hello"), 54.0), 90.0);

        // 中文字符宽度为 2：8 个字 16 列，折成两行
        assert_eq!(p.rows_for("对这个世界如果你"), 2);
        assert_eq!(p.natural_height(0, &line("对这个世界如果你"), 54.0), 130.0);
    }

    #[test]
    fn test_resize_reports_width_change() {
        let mut p = panel(40, 20);
        assert!(!p.set_area(Rect::new(0, 0, 40, 30)));
        assert!(p.set_area(Rect::new(0, 0, 60, 30)));
    }

    #[test]
    fn test_apply_and_hit_test() {
        let mut p = panel(40, 20);
        let mut session = PlayerSession::new(
            LayoutMetrics::default(),
            Duration::from_millis(100),
            Duration::from_secs(5),
        );
        let ticket = session.begin_load();
        session.apply_lyrics(
            ticket,
            Lyrics::from_lrc("[00:00.00]一\n[00:05.00]二\n[00:10.00]三", "test"),
        );
        session.sync_to(0.0);
        session.render(&mut p);

        // 内区高 18，锚点在第 6 行；行距 120px = 3 行
        let tops: Vec<i32> = p.placed().iter().map(|l| l.top).collect();
        assert_eq!(tops, vec![6, 9, 12]);

        // 内区从 (1,1) 开始
        assert_eq!(p.line_at(10, 7), Some(0));
        assert_eq!(p.line_at(10, 10), Some(1));
        assert_eq!(p.line_at(10, 8), None);
        assert_eq!(p.line_at(0, 7), None);
    }
}
