use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::player::TrackInfo;
use crate::tui::theme::Theme;

/// 曲目信息组件
pub struct PlayerInfo<'a> {
    track: Option<&'a TrackInfo>,
    loading: bool,
    theme: &'a Theme,
}

impl<'a> PlayerInfo<'a> {
    pub fn new(track: Option<&'a TrackInfo>, loading: bool, theme: &'a Theme) -> Self {
        Self {
            track,
            loading,
            theme,
        }
    }

    /// 渲染曲目信息
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());

        let line = match self.track {
            Some(track) => self.create_track_line(track),
            None => {
                let message = if self.loading {
                    "正在读取曲目..."
                } else {
                    "🎵 没有曲目"
                };
                Line::from(Span::styled(message, self.theme.status_style()))
            }
        };

        let paragraph = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    /// 创建紧凑的曲目信息行：艺术家 - 歌名 • 封面
    fn create_track_line(&self, track: &'a TrackInfo) -> Line<'a> {
        let mut spans = Vec::new();

        if let Some(artist) = track.artist.as_deref().filter(|a| !a.trim().is_empty()) {
            spans.push(Span::styled(artist, self.theme.text_style()));
            spans.push(Span::styled(" - ", self.theme.status_style()));
        }
        spans.push(Span::styled(track.title.as_str(), self.theme.accent_style()));

        if let Some(cover) = &track.cover {
            spans.push(Span::styled(" • ", self.theme.status_style()));
            spans.push(Span::styled(format!("封面 {}", cover), self.theme.dimmed_style()));
        }

        Line::from(spans)
    }
}
