use anyhow::Result;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Position, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::player::{Player, PlayerEvent};
use crate::tui::events::{EventHandler, TuiEvent};
use crate::tui::theme::Theme;
use crate::tui::ui::{create_inner_layout, render_help, render_ui, UiState};
use crate::tui::widgets::{LyricsPanel, ProgressBar, SourceStatus};

type Backend = CrosstermBackend<Stdout>;

/// TUI 应用主结构
pub struct TuiApp {
    config: Arc<Config>,
    player: Player,
    panel: LyricsPanel,
    theme: Theme,
    ui_state: UiState,
    should_quit: bool,
    show_help: bool,
    needs_redraw: bool,
    /// 上次绘制时的播放秒数，用于刷新进度条
    last_second: u64,
}

/// 歌词来源的显示名称
fn source_label(source: &str) -> String {
    match source {
        "embedded" => "内嵌标签".to_string(),
        "sidecar" => "LRC 文件".to_string(),
        "file" => "指定文件".to_string(),
        other => other.to_string(),
    }
}

impl TuiApp {
    pub fn new(config: Arc<Config>, player: Player) -> Self {
        let panel = LyricsPanel::new(&config.layout, config.display.px_per_row);
        let mut ui_state = UiState::default();
        if player.is_loading() {
            ui_state.status_info.source_status = SourceStatus::Loading;
        }

        Self {
            config,
            player,
            panel,
            theme: Theme::default(),
            ui_state,
            should_quit: false,
            show_help: false,
            needs_redraw: true,
            last_second: 0,
        }
    }

    /// 运行 TUI 应用
    pub async fn run(&mut self, player_events: mpsc::Receiver<PlayerEvent>) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = self.event_loop(&mut terminal, player_events).await;

        // 无论主循环是否出错都恢复终端
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<Backend>,
        player_events: mpsc::Receiver<PlayerEvent>,
    ) -> Result<()> {
        let (tx, mut rx) = mpsc::channel(100);
        let mut event_handler = EventHandler::new(player_events, self.config.engine.poll_interval());

        let handle = tokio::spawn(async move {
            if let Err(err) = event_handler.run(tx).await {
                error!("事件处理器错误: {}", err);
            }
        });

        while !self.should_quit {
            if self.needs_redraw {
                self.draw(terminal)?;
                self.needs_redraw = false;
            }

            match rx.recv().await {
                Some(event) => self.handle_event(event, Instant::now()),
                None => break,
            }
        }

        handle.abort();
        Ok(())
    }

    /// 绘制一帧：先更新面板区域并让会话计算歌词位置，再渲染界面
    fn draw(&mut self, terminal: &mut Terminal<Backend>) -> Result<()> {
        let Self {
            player,
            panel,
            ui_state,
            theme,
            show_help,
            ..
        } = self;

        terminal.draw(|f| {
            ui_state.areas = create_inner_layout(f.area());
            if panel.set_area(ui_state.areas.lyrics) {
                debug!("歌词区宽度变化，重新测量");
                player.session_mut().reset_layout();
            }
            ui_state.status_info.mode = player.session().mode();
            player.session_mut().render(panel);

            render_ui(f, player, panel, ui_state, theme);
            if *show_help {
                render_help(f, theme);
            }
        })?;

        self.last_second = self.player.position() as u64;
        Ok(())
    }

    fn handle_event(&mut self, event: TuiEvent, now: Instant) {
        match event {
            TuiEvent::Key(key) => {
                if EventHandler::is_quit_key(&key) {
                    self.should_quit = true;
                } else if self.show_help {
                    // 任意键关闭帮助
                    self.show_help = false;
                } else {
                    self.handle_key_input(key, now);
                }
                self.needs_redraw = true;
            }
            TuiEvent::Mouse(mouse) => self.handle_mouse(mouse, now),
            TuiEvent::Resize(width, height) => {
                debug!("终端尺寸变化: {}x{}", width, height);
                self.needs_redraw = true;
            }
            TuiEvent::Player(event) => {
                self.handle_player_event(event, now);
                self.needs_redraw = true;
            }
            TuiEvent::Tick => {
                let mut redraw = self.player.tick(now);
                redraw |= self.player.session_mut().take_needs_render();
                redraw |= self.player.position() as u64 != self.last_second;
                self.needs_redraw |= redraw;
            }
        }
    }

    /// 处理按键输入
    fn handle_key_input(&mut self, key: KeyEvent, now: Instant) {
        let seek_step = self.player.settings().seek_step_secs;
        let volume_step = self.player.settings().volume_step;

        let result = match key.code {
            KeyCode::Char(' ') => self.player.toggle_play(now),
            KeyCode::Left => self.player.seek_by(-seek_step),
            KeyCode::Right => self.player.seek_by(seek_step),
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
                self.player.adjust_volume(volume_step)
            }
            KeyCode::Down | KeyCode::Char('-') => self.player.adjust_volume(-volume_step),
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.show_help = true;
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.ui_state.status_info.message = Some(e.to_string());
        }
    }

    /// 处理鼠标：滚轮浏览、进出歌词区、点击跳转
    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let position = Position::new(mouse.column, mouse.row);
        let inside = self.panel.area().contains(position);

        match mouse.kind {
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp if inside => {
                self.update_hover(true);
                let delta = self.config.engine.wheel_delta;
                let delta = if mouse.kind == MouseEventKind::ScrollDown {
                    delta
                } else {
                    -delta
                };
                self.needs_redraw |= self.player.session_mut().wheel(delta, now);
            }
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.update_hover(inside),
            MouseEventKind::Down(MouseButton::Left) => {
                self.update_hover(inside);
                if inside {
                    if let Some(index) = self.panel.line_at(mouse.column, mouse.row) {
                        match self.player.click_line(index) {
                            Ok(true) => {
                                debug!("点击歌词第{}行", index);
                                self.needs_redraw = true;
                            }
                            Ok(false) => {}
                            Err(e) => self.ui_state.status_info.message = Some(e.to_string()),
                        }
                    }
                } else if let Some(fraction) = ProgressBar::fraction_at(
                    self.ui_state.areas.progress,
                    mouse.column,
                    mouse.row,
                ) {
                    if let Err(e) = self.player.seek_fraction(fraction) {
                        self.ui_state.status_info.message = Some(e.to_string());
                    }
                    self.needs_redraw = true;
                }
            }
            _ => {}
        }
    }

    fn update_hover(&mut self, inside: bool) {
        let session = self.player.session_mut();
        if inside && !session.is_hovering() {
            session.pointer_enter();
        } else if !inside && session.is_hovering() {
            self.needs_redraw |= session.pointer_leave();
        }
    }

    /// 处理后台加载事件
    fn handle_player_event(&mut self, event: PlayerEvent, now: Instant) {
        let failed = match &event {
            PlayerEvent::LoadFailed { error, .. } => Some(error.clone()),
            PlayerEvent::TrackLoaded { .. } => None,
        };
        if !self.player.handle_event(event, now) {
            return;
        }

        let status = &mut self.ui_state.status_info;
        if let Some(error) = failed {
            status.source_status = SourceStatus::Failed;
            status.lyrics_source = None;
            status.message = Some(format!("加载失败: {}", error));
            return;
        }

        status.message = None;
        match self.player.lyrics_source() {
            Some(source) => {
                status.lyrics_source = Some(source_label(source));
                status.source_status = SourceStatus::Success;
            }
            None => {
                status.lyrics_source = None;
                status.source_status = SourceStatus::Failed;
            }
        }
        if let Some(track) = self.player.track() {
            info!("TUI 显示曲目: {}", track.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    use super::*;
    use crate::engine::ScrollMode;
    use crate::lyrics::{Lyrics, LyricsResolver};
    use crate::player::LoftyMetadata;

    fn app_with_lyrics() -> TuiApp {
        let config = Arc::new(Config::default());
        let mut player = Player::new(&config, Arc::new(LoftyMetadata), LyricsResolver::new(vec![]));
        let session = player.session_mut();
        let ticket = session.begin_load();
        session.apply_lyrics(
            ticket,
            Lyrics::from_lrc("[00:00]一\n[00:05]二\n[00:10]三\n[00:15]四", "test"),
        );
        session.sync_to(0.0);

        let mut app = TuiApp::new(config, player);
        app.panel.set_area(Rect::new(0, 4, 40, 17));
        app
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_wheel_over_panel_and_pointer_leave() {
        let now = Instant::now();
        let mut app = app_with_lyrics();

        // 面板外的滚轮不进入手动滚动
        app.handle_mouse(mouse(MouseEventKind::ScrollDown, 10, 1), now);
        assert_eq!(app.player.session().mode(), ScrollMode::AutoFollow);

        app.handle_mouse(mouse(MouseEventKind::ScrollDown, 10, 10), now);
        let session = app.player.session();
        assert_eq!(session.mode(), ScrollMode::ManualScroll);
        assert!(session.is_hovering());
        assert_eq!(session.current_index(), Some(1));

        // 面板内移动保持手动滚动
        app.handle_mouse(mouse(MouseEventKind::Moved, 12, 12), now);
        assert_eq!(app.player.session().mode(), ScrollMode::ManualScroll);

        app.needs_redraw = false;
        app.handle_mouse(mouse(MouseEventKind::Moved, 10, 1), now);
        let session = app.player.session();
        assert_eq!(session.mode(), ScrollMode::AutoFollow);
        assert!(!session.is_hovering());
        assert_eq!(session.current_index(), Some(0));
        assert!(app.needs_redraw);
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label("embedded"), "内嵌标签");
        assert_eq!(source_label("sidecar"), "LRC 文件");
        assert_eq!(source_label("custom"), "custom");
    }
}
