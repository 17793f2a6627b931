use serde::Serialize;

use crate::lyrics::LyricLine;

/// 格式化时间（秒转为 m:ss 格式）
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs <= 0.0 {
        return "0:00".to_string();
    }
    let total = secs.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// 简单模式下的一行文本输出
pub fn format_line(line: Option<&LyricLine>, show_timestamp: bool) -> String {
    match line {
        Some(line) if show_timestamp => format!("[{}] {}", format_time(line.time), line.text),
        Some(line) => line.text.clone(),
        None => String::new(),
    }
}

/// JSON 输出模式下的一条记录
#[derive(Debug, Serialize)]
pub struct LineRecord<'a> {
    pub index: Option<usize>,
    pub time: Option<f64>,
    pub text: Option<&'a str>,
    pub position: f64,
    pub title: Option<&'a str>,
}

impl<'a> LineRecord<'a> {
    pub fn new(
        index: Option<usize>,
        line: Option<&'a LyricLine>,
        position: f64,
        title: Option<&'a str>,
    ) -> Self {
        Self {
            index,
            time: line.map(|l| l.time),
            text: line.map(|l| l.text.as_str()),
            position,
            title,
        }
    }
}
