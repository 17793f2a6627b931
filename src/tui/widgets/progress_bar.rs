use ratatui::{
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::display::format_time;
use crate::player::PlaybackStatus;
use crate::tui::theme::Theme;

/// 进度条左侧时间列宽度（"mm:ss "）
const LEFT_WIDTH: u16 = 6;
/// 进度条右侧时间、状态和音量宽度（" mm:ss ▶ 100%"）
const RIGHT_WIDTH: u16 = 14;

/// 进度条组件
pub struct ProgressBar<'a> {
    position: f64,
    duration: f64,
    volume: f32,
    status: PlaybackStatus,
    theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(
        position: f64,
        duration: f64,
        volume: f32,
        status: PlaybackStatus,
        theme: &'a Theme,
    ) -> Self {
        Self {
            position,
            duration,
            volume,
            status,
            theme,
        }
    }

    /// 进度条字符所在区域
    pub fn bar_rect(area: Rect) -> Rect {
        let width = area
            .width
            .saturating_sub(LEFT_WIDTH + RIGHT_WIDTH);
        Rect::new(area.x + LEFT_WIDTH.min(area.width), area.y, width, area.height.min(1))
    }

    /// 点击位置对应的进度比例
    pub fn fraction_at(area: Rect, column: u16, row: u16) -> Option<f64> {
        let bar = Self::bar_rect(area);
        if bar.width == 0 || !bar.contains(Position::new(column, row)) {
            return None;
        }
        Some(f64::from(column - bar.x) / f64::from(bar.width.saturating_sub(1).max(1)))
    }

    /// 渲染进度条
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let width = Self::bar_rect(area).width as usize;
        let mut spans = vec![Span::styled(
            format!("{:>5} ", format_time(self.position)),
            self.theme.text_style(),
        )];
        spans.extend(self.create_progress_bar_chars(width));
        spans.push(Span::styled(
            format!(" {:<5}", format_time(self.duration)),
            self.theme.text_style(),
        ));
        spans.push(Span::styled(
            format!(" {} {:>3}%", self.status_symbol(), (self.volume * 100.0).round() as u32),
            self.theme.status_style(),
        ));

        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// 创建进度条字符
    fn create_progress_bar_chars(&self, total_width: usize) -> Vec<Span<'static>> {
        if total_width == 0 {
            return Vec::new();
        }
        if self.duration <= 0.0 {
            // 如果总长度为0，显示空进度条
            return vec![Span::styled("░".repeat(total_width), self.theme.status_style())];
        }

        let progress = (self.position / self.duration).clamp(0.0, 1.0);
        let filled = ((progress * total_width as f64) as usize).min(total_width - 1);

        vec![
            Span::styled("█".repeat(filled), self.theme.progress_style()),
            // 播放头
            Span::styled("▶", self.theme.current_line_style()),
            Span::styled(
                "░".repeat(total_width - filled - 1),
                self.theme.status_style(),
            ),
        ]
    }

    fn status_symbol(&self) -> &'static str {
        match self.status {
            PlaybackStatus::Playing => "▶",
            PlaybackStatus::Paused => "⏸",
            PlaybackStatus::Stopped => "⏹",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_at() {
        let area = Rect::new(0, 10, 60, 1);
        let bar = ProgressBar::bar_rect(area);
        assert_eq!(bar.x, 6);
        assert_eq!(bar.width, 40);

        assert_eq!(ProgressBar::fraction_at(area, 6, 10), Some(0.0));
        assert_eq!(ProgressBar::fraction_at(area, 45, 10), Some(1.0));
        assert_eq!(ProgressBar::fraction_at(area, 2, 10), None);
        assert_eq!(ProgressBar::fraction_at(area, 20, 11), None);
    }
}
