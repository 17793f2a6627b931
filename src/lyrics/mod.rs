mod manager;
mod parser;
pub mod providers;
mod tags;

use std::collections::HashMap;

use serde::Serialize;

pub use manager::{LyricsResolver, ResolvedLyrics};
pub use parser::LrcParser;
pub use tags::{
    CoverArt, LyricsField, LyricsFrame, TagBag, TxxxField, TxxxFrame, UsltEntry, UsltField,
    UsltFrame,
};

/// 表示单行歌词
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricLine {
    /// 开始时间（秒）
    pub time: f64,
    /// 歌词文本（非空）
    pub text: String,
}

/// 完整的歌词
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lyrics {
    /// 歌词元数据
    pub metadata: LyricsMetadata,
    /// 按时间排序的歌词行
    pub lines: Vec<LyricLine>,
}

impl Lyrics {
    /// 从 LRC 文本构建歌词，来源记为 `source`
    pub fn from_lrc(content: &str, source: &str) -> Self {
        let (lines, tags) = LrcParser::parse_document(content);
        Self {
            metadata: LyricsMetadata {
                source: source.to_string(),
                extra: tags,
            },
            lines,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// 歌词元数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricsMetadata {
    /// 歌词来源
    pub source: String,
    /// LRC 头部标签，如 ti / ar / al / offset
    pub extra: HashMap<String, String>,
}
