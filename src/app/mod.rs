// 应用装配：歌词来源、播放器和前端

mod core;

pub use self::core::App;
