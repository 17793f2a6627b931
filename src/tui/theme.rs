use ratatui::style::{Color, Modifier, Style};

use crate::engine::LineStyle;

/// 模糊半径超过该值时用暗淡修饰符表示
const BLUR_DIM_THRESHOLD: f32 = 2.0;

/// TUI 主题配置
#[derive(Debug, Clone)]
pub struct Theme {
    pub border: Color,
    pub text: Color,
    pub accent: Color,
    pub current_line: Color,
    pub progress_bar: Color,
    pub status_text: Color,
    pub dimmed_text: Color,
    /// 手动滚动时实际播放行的侧边标记
    pub marker: Color,
}

impl Default for Theme {
    /// 默认主题（使用终端配色）
    fn default() -> Self {
        Self::terminal()
    }
}

impl Theme {
    /// 使用终端原生配色的主题
    pub fn terminal() -> Self {
        Self {
            border: Color::DarkGray,
            text: Color::Reset,
            accent: Color::Green,
            current_line: Color::Yellow,
            progress_bar: Color::Blue,
            status_text: Color::Gray,
            dimmed_text: Color::DarkGray,
            marker: Color::Cyan,
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn accent_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn current_line_style(&self) -> Style {
        Style::default()
            .fg(self.current_line)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn progress_style(&self) -> Style {
        Style::default().fg(self.progress_bar)
    }

    pub fn status_style(&self) -> Style {
        Style::default().fg(self.status_text)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed_style(&self) -> Style {
        Style::default().fg(self.dimmed_text)
    }

    pub fn marker_style(&self) -> Style {
        Style::default()
            .fg(self.marker)
            .add_modifier(Modifier::BOLD)
    }

    /// 把一行歌词的透明度、模糊和状态映射为终端样式
    ///
    /// 终端没有透明度，按档位选择颜色：不透明为正文色，半透明为弱化色。
    pub fn lyric_style(&self, line: &LineStyle) -> Style {
        if line.active {
            return self.current_line_style();
        }

        let mut style = if line.opacity >= 0.6 {
            self.text_style()
        } else {
            self.dimmed_style()
        };
        if line.blur > BLUR_DIM_THRESHOLD {
            style = style.add_modifier(Modifier::DIM);
        }
        if line.past {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(opacity: f32, blur: f32) -> LineStyle {
        LineStyle {
            index: 0,
            offset_y: 0.0,
            opacity,
            blur,
            font_size: 50.0,
            active: false,
            past: false,
            wrapping: false,
            playing_marker: false,
        }
    }

    #[test]
    fn test_lyric_style_levels() {
        let theme = Theme::default();

        let active = LineStyle {
            active: true,
            ..line(1.0, 0.0)
        };
        assert_eq!(theme.lyric_style(&active), theme.current_line_style());

        // 手动滚动的非锚点行 0.7
        assert_eq!(theme.lyric_style(&line(0.7, 0.0)), theme.text_style());
        // 自动跟随的非当前行 0.5，距离 1 模糊 1.5
        assert_eq!(theme.lyric_style(&line(0.5, 1.5)), theme.dimmed_style());
        assert!(theme
            .lyric_style(&line(0.5, 4.5))
            .add_modifier
            .contains(Modifier::DIM));
    }
}
