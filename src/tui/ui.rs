use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::player::Player;
use crate::tui::theme::Theme;
use crate::tui::widgets::{LyricsPanel, PlayerInfo, ProgressBar, StatusBar, StatusInfo};

/// 主界面各区域
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiAreas {
    pub info: Rect,
    pub lyrics: Rect,
    pub progress: Rect,
    pub status: Rect,
}

/// UI 状态
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub areas: UiAreas,
    pub status_info: StatusInfo,
}

/// 创建内部布局（在主边框内）
pub fn create_inner_layout(area: Rect) -> UiAreas {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 曲目信息
            Constraint::Min(6),    // 歌词面板
            Constraint::Length(1), // 进度条
            Constraint::Length(1), // 状态栏
        ])
        .split(inner);

    UiAreas {
        info: chunks[0],
        lyrics: chunks[1],
        progress: chunks[2],
        status: chunks[3],
    }
}

/// 渲染主界面
///
/// 歌词面板在调用前已由会话完成本帧的位置计算。
pub fn render_ui(
    f: &mut Frame,
    player: &Player,
    panel: &LyricsPanel,
    ui_state: &UiState,
    theme: &Theme,
) {
    let size = f.area();

    let main_title = match player.track() {
        Some(track) => format!("Lyric Stage - {}", track.title),
        None => "Lyric Stage".to_string(),
    };
    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(main_title)
        .title_style(theme.title_style());
    f.render_widget(main_block, size);

    let areas = &ui_state.areas;

    PlayerInfo::new(player.track(), player.is_loading(), theme).render(f, areas.info);

    let placeholder = if player.is_loading() {
        "正在加载歌词..."
    } else {
        "❌ 未找到歌词"
    };
    panel.render(f, player.session().lines(), theme, placeholder);

    ProgressBar::new(
        player.position(),
        player.duration(),
        player.volume(),
        player.status(),
        theme,
    )
    .render(f, areas.progress);

    StatusBar::new(&ui_state.status_info, theme).render(f, areas.status);
}

/// 渲染帮助界面（覆盖显示）
pub fn render_help(f: &mut Frame, theme: &Theme) {
    let help_area = centered_rect(60, 70, f.area());

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:>10}", k), theme.accent_style()),
            Span::styled(format!("   {}", desc), theme.text_style()),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled("Lyric Stage - 帮助", theme.title_style())),
        Line::from(""),
        Line::from(Span::styled("快捷键操作:", theme.accent_style())),
        key("空格", "播放/暂停"),
        key("← / →", "后退/前进"),
        key("↑ / ↓", "音量"),
        key("H / ?", "显示/隐藏帮助"),
        key("Q / Esc", "退出程序"),
        Line::from(""),
        Line::from(Span::styled("鼠标:", theme.accent_style())),
        key("滚轮", "浏览歌词，停止滚动 5 秒后回到当前行"),
        key("点击歌词", "浏览时跳转到该行"),
        key("点击进度条", "跳转"),
        key("移出歌词区", "立即回到当前行"),
        Line::from(""),
        Line::from(Span::styled("按任意键关闭帮助", theme.dimmed_style())),
    ];

    let help_paragraph = Paragraph::new(help_lines)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .title("帮助")
                .borders(Borders::ALL)
                .border_style(theme.accent_style()),
        );

    f.render_widget(Clear, help_area);
    f.render_widget(help_paragraph, help_area);
}

/// 创建居中矩形
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
