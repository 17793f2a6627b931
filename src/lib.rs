// 应用核心库

// 模块导出
pub mod app;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod lyrics;
pub mod player;
pub mod tui;

pub use error::PlayerError;
