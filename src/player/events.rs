use std::path::PathBuf;

use crate::engine::LoadTicket;
use crate::player::LoadedTrack;

/// 后台加载任务发回的事件
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// 曲目加载完成
    TrackLoaded {
        ticket: LoadTicket,
        track: Box<LoadedTrack>,
    },
    /// 曲目加载失败（文件无法读取）
    LoadFailed {
        ticket: LoadTicket,
        path: PathBuf,
        error: String,
    },
}

impl PlayerEvent {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            PlayerEvent::TrackLoaded { ticket, .. } | PlayerEvent::LoadFailed { ticket, .. } => {
                *ticket
            }
        }
    }
}
