use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::engine::ScrollMode;
use crate::tui::theme::Theme;

/// 状态栏信息
#[derive(Debug, Clone)]
pub struct StatusInfo {
    pub lyrics_source: Option<String>,
    pub source_status: SourceStatus,
    pub mode: ScrollMode,
    /// 最近一条提示（例如加载失败）
    pub message: Option<String>,
    pub shortcuts_enabled: bool,
}

/// 歌词源状态
#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    Success,
    Loading,
    Failed,
    None,
}

/// 状态栏组件
pub struct StatusBar<'a> {
    status_info: &'a StatusInfo,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(status_info: &'a StatusInfo, theme: &'a Theme) -> Self {
        Self {
            status_info,
            theme,
        }
    }

    /// 渲染状态栏
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(self.create_status_line());
        f.render_widget(paragraph, area);
    }

    fn create_status_line(&self) -> Line<'a> {
        let mut spans = Vec::new();

        self.add_lyrics_source_status(&mut spans);

        spans.push(Span::styled(" │ ", self.theme.status_style()));
        let mode = match self.status_info.mode {
            ScrollMode::AutoFollow => Span::styled("跟随", self.theme.accent_style()),
            ScrollMode::ManualScroll => Span::styled("浏览 (点击歌词跳转)", self.theme.marker_style()),
        };
        spans.push(mode);

        if let Some(message) = &self.status_info.message {
            spans.push(Span::styled(" │ ", self.theme.status_style()));
            spans.push(Span::styled(message.as_str(), self.theme.current_line_style()));
        }

        if self.status_info.shortcuts_enabled {
            spans.push(Span::styled(" │ ", self.theme.status_style()));
            self.add_shortcuts(&mut spans);
        }

        Line::from(spans)
    }

    /// 添加歌词源状态
    fn add_lyrics_source_status(&self, spans: &mut Vec<Span<'a>>) {
        let (symbol, style) = match self.status_info.source_status {
            SourceStatus::Success => ("✓", self.theme.accent_style()),
            SourceStatus::Loading => ("⟳", self.theme.status_style()),
            SourceStatus::Failed => ("✗", self.theme.status_style()),
            SourceStatus::None => ("○", self.theme.status_style()),
        };

        match &self.status_info.lyrics_source {
            Some(source) => {
                spans.push(Span::styled(source.as_str(), self.theme.text_style()));
                spans.push(Span::styled(" ", self.theme.text_style()));
                spans.push(Span::styled(symbol, style));
            }
            None => {
                spans.push(Span::styled("无歌词 ", self.theme.status_style()));
                spans.push(Span::styled(symbol, style));
            }
        }
    }

    /// 添加快捷键提示
    fn add_shortcuts(&self, spans: &mut Vec<Span<'a>>) {
        let shortcuts = [("[空格]", "播放"), ("[←→]", "跳转"), ("[h]", "帮助"), ("[q]", "退出")];

        for (i, (key, desc)) in shortcuts.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", self.theme.text_style()));
            }
            spans.push(Span::styled(*key, self.theme.accent_style()));
            spans.push(Span::styled(*desc, self.theme.text_style()));
        }
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self {
            lyrics_source: None,
            source_status: SourceStatus::None,
            mode: ScrollMode::AutoFollow,
            message: None,
            shortcuts_enabled: true,
        }
    }
}
