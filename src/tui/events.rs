use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::player::PlayerEvent;

/// TUI 事件类型
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// 键盘输入事件
    Key(KeyEvent),
    /// 鼠标事件（滚轮、移动、点击）
    Mouse(MouseEvent),
    /// 终端尺寸变化
    Resize(u16, u16),
    /// 后台加载事件
    Player(PlayerEvent),
    /// 定时驱动事件
    Tick,
}

/// 事件处理器
pub struct EventHandler {
    player_events: mpsc::Receiver<PlayerEvent>,
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(player_events: mpsc::Receiver<PlayerEvent>, tick_rate: Duration) -> Self {
        Self {
            player_events,
            tick_rate,
        }
    }

    /// 监听事件并发送到通道
    pub async fn run(&mut self, tx: mpsc::Sender<TuiEvent>) -> Result<()> {
        let mut tick_interval = tokio::time::interval(self.tick_rate);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = self.player_events.recv() => {
                    if tx.send(TuiEvent::Player(event)).await.is_err() {
                        break; // 接收端已关闭
                    }
                }

                _ = tick_interval.tick() => {
                    // 非阻塞读取所有待处理的终端输入
                    while event::poll(Duration::ZERO)? {
                        let tui_event = match event::read()? {
                            Event::Key(key) if key.kind == KeyEventKind::Press => TuiEvent::Key(key),
                            Event::Mouse(mouse) => TuiEvent::Mouse(mouse),
                            Event::Resize(w, h) => TuiEvent::Resize(w, h),
                            _ => continue,
                        };
                        if tx.send(tui_event).await.is_err() {
                            return Ok(());
                        }
                    }

                    if tx.send(TuiEvent::Tick).await.is_err() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// 处理按键事件，返回是否应该退出
    pub fn is_quit_key(key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => true,
            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        }
    }
}
