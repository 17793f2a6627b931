// 播放控制模块
// 把外部传输（播放时钟）和歌词会话绑定在一起

mod events;
mod manager;
mod metadata;
mod transport;

pub use events::PlayerEvent;
pub use manager::{PlaybackStatus, Player};
pub use metadata::{load_track, LoadedTrack, LoftyMetadata, MetadataSource, TrackInfo, TrackTags};
pub use transport::{ClockTransport, Transport};
