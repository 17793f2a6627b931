use serde::{Deserialize, Serialize};

/// 音频文件的标签集合，字段形态与常见标签读取库的输出一致
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagBag {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub picture: Option<CoverArt>,
    pub lyrics: Option<LyricsField>,
    #[serde(rename = "USLT")]
    pub uslt: Option<UsltField>,
    #[serde(rename = "TXXX")]
    pub txxx: Option<TxxxField>,
}

/// 嵌入封面
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverArt {
    /// MIME 类型，如 image/jpeg
    pub format: String,
    pub data: Vec<u8>,
}

/// 通用 lyrics 字段：字符串或带 lyrics 属性的对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LyricsField {
    Text(String),
    Frame(LyricsFrame),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsFrame {
    pub lyrics: Option<String>,
}

/// USLT 字段：字符串、数组或单个对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UsltField {
    Text(String),
    List(Vec<UsltEntry>),
    Frame(UsltFrame),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UsltEntry {
    Text(String),
    Frame(UsltFrame),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsltFrame {
    pub lyrics: Option<String>,
    pub text: Option<String>,
}

/// TXXX 字段：单个自定义文本帧或帧数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxxxField {
    List(Vec<Option<TxxxFrame>>),
    Frame(TxxxFrame),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxxxFrame {
    pub description: Option<String>,
    pub data: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl UsltFrame {
    fn text(&self) -> Option<&str> {
        non_empty(&self.lyrics).or_else(|| non_empty(&self.text))
    }
}

impl TxxxFrame {
    fn lyrics(&self) -> Option<&str> {
        let is_lyrics = self
            .description
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case("lyrics"));
        if is_lyrics {
            non_empty(&self.data)
        } else {
            None
        }
    }
}

impl TagBag {
    /// 选出第一段可用的歌词文本
    ///
    /// 优先级: lyrics 字段 > USLT（字符串/数组首项/对象）> 描述为 LYRICS 的 TXXX。
    pub fn lyrics_text(&self) -> Option<&str> {
        self.plain_lyrics()
            .or_else(|| self.uslt_lyrics())
            .or_else(|| self.txxx_lyrics())
    }

    fn plain_lyrics(&self) -> Option<&str> {
        match self.lyrics.as_ref()? {
            LyricsField::Text(text) => Some(text.as_str()).filter(|s| !s.is_empty()),
            LyricsField::Frame(frame) => non_empty(&frame.lyrics),
        }
    }

    fn uslt_lyrics(&self) -> Option<&str> {
        match self.uslt.as_ref()? {
            UsltField::Text(text) => Some(text.as_str()).filter(|s| !s.is_empty()),
            // 数组只看第一项
            UsltField::List(entries) => match entries.first()? {
                UsltEntry::Text(text) => Some(text.as_str()).filter(|s| !s.is_empty()),
                UsltEntry::Frame(frame) => frame.text(),
            },
            UsltField::Frame(frame) => frame.text(),
        }
    }

    fn txxx_lyrics(&self) -> Option<&str> {
        match self.txxx.as_ref()? {
            TxxxField::List(frames) => frames
                .iter()
                .flatten()
                .find(|f| {
                    f.description
                        .as_deref()
                        .is_some_and(|d| d.eq_ignore_ascii_case("lyrics"))
                })
                .and_then(|f| f.lyrics()),
            TxxxField::Frame(frame) => frame.lyrics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(json: &str) -> TagBag {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_plain_lyrics_wins() {
        let tags = bag(r#"{
            "lyrics": "[00:01]plain",
            "USLT": "[00:01]uslt",
            "TXXX": {"description": "LYRICS", "data": "[00:01]txxx"}
        }"#);
        assert_eq!(tags.lyrics_text(), Some("[00:01]plain"));

        let tags = bag(r#"{"lyrics": {"lyrics": "[00:01]object"}}"#);
        assert_eq!(tags.lyrics_text(), Some("[00:01]object"));
    }

    #[test]
    fn test_uslt_shapes() {
        let tags = bag(r#"{"USLT": [{"lyrics": "", "text": "from text"}, "second"]}"#);
        assert_eq!(tags.lyrics_text(), Some("from text"));

        let tags = bag(r#"{"USLT": ["first", "second"]}"#);
        assert_eq!(tags.lyrics_text(), Some("first"));

        let tags = bag(r#"{"USLT": {"lyrics": "object"}}"#);
        assert_eq!(tags.lyrics_text(), Some("object"));

        let tags = bag(r#"{"lyrics": "", "USLT": "fallback"}"#);
        assert_eq!(tags.lyrics_text(), Some("fallback"));
    }

    #[test]
    fn test_txxx_description_case_insensitive() {
        let tags = bag(r#"{"TXXX": [
            null,
            {"description": "comment", "data": "nope"},
            {"description": "Lyrics", "data": "yes"}
        ]}"#);
        assert_eq!(tags.lyrics_text(), Some("yes"));

        let tags = bag(r#"{"TXXX": {"description": "LYRICS"}}"#);
        assert_eq!(tags.lyrics_text(), None);
    }

    #[test]
    fn test_no_lyrics() {
        let tags = bag(r#"{"title": "歌名", "artist": "歌手"}"#);
        assert_eq!(tags.lyrics_text(), None);
        assert_eq!(tags.title.as_deref(), Some("歌名"));
    }
}
