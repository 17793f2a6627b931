// 显示管理模块
// 简单输出模式：只在实际播放行变化时打印一行文本或 JSON

mod formatter;
mod manager;

pub use formatter::{format_line, format_time, LineRecord};
pub use manager::{run_simple_output, SimpleOutput};
