use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::lyrics::LyricLine;

// 时间标签: [mm:ss] 或 [mm:ss.f] / [mm:ss.ff] / [mm:ss.fff]
static TIME_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{1,3}):(\d{2})(?:\.(\d{1,3}))?]").expect("时间标签正则无效")
});

// 元数据标签: 整行形如 [ar:艺术家]
static META_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([A-Za-z]+):(.*)]$").expect("元数据标签正则无效"));

/// LRC歌词解析器
pub struct LrcParser;

impl LrcParser {
    /// 解析带时间标签的歌词文本，返回按时间升序排列的歌词行
    ///
    /// 不会返回错误：无法识别的行直接忽略，空输入得到空序列。
    pub fn parse(content: &str) -> Vec<LyricLine> {
        let mut lines = Vec::new();

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            Self::parse_line(line, &mut lines);
        }

        // sort_by 是稳定排序，同一时间的行保持原文顺序
        lines.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut seen = HashSet::new();
        lines.retain(|l| seen.insert((l.time.to_bits(), l.text.clone())));

        lines
    }

    /// 解析完整的 LRC 文档，同时收集头部元数据并应用 offset
    pub fn parse_document(content: &str) -> (Vec<LyricLine>, HashMap<String, String>) {
        let mut metadata = HashMap::new();

        for raw in content.lines() {
            let line = raw.trim();
            if let Some(cap) = META_TAG.captures(line) {
                let key = cap[1].to_ascii_lowercase();
                let value = cap[2].trim().to_string();
                metadata.insert(key, value);
            }
        }

        let mut lines = Self::parse(content);

        // offset 单位为毫秒，正值表示歌词提前
        if let Some(offset_ms) = metadata
            .get("offset")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v != 0)
        {
            debug!("应用歌词偏移: {}ms", offset_ms);
            let shift = offset_ms as f64 / 1000.0;
            for line in &mut lines {
                line.time = (line.time - shift).max(0.0);
            }
            lines.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        (lines, metadata)
    }

    /// 解析单行：去掉所有时间标签后的文本由该行每个时间标签共享
    fn parse_line(line: &str, out: &mut Vec<LyricLine>) {
        let times: Vec<f64> = TIME_TAG
            .captures_iter(line)
            .filter_map(|cap| Self::tag_seconds(&cap))
            .collect();
        if times.is_empty() {
            return;
        }

        let text = TIME_TAG.replace_all(line, "");
        let text = text.trim();
        if text.is_empty() {
            debug!("丢弃无文本的时间标签行: '{}'", line);
            return;
        }

        out.extend(times.into_iter().map(|time| LyricLine {
            time,
            text: text.to_string(),
        }));
    }

    /// 时间标签换算为秒，小数部分补齐或截断为 3 位毫秒
    fn tag_seconds(cap: &Captures) -> Option<f64> {
        let minutes = cap[1].parse::<u32>().ok()?;
        let seconds = cap[2].parse::<u32>().ok()?;
        let millis = match cap.get(3) {
            Some(frac) => {
                let padded = format!("{:0<3}", frac.as_str());
                padded[..3].parse::<u32>().ok()?
            }
            None => 0,
        };

        Some(f64::from(minutes * 60 + seconds) + f64::from(millis) / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lrc_parser() {
        let lrc_content = r#"[ar:周杰伦]
[ti:稻香]
[al:魔杰座]
[by:Lyrics by JimChou]
[00:00.00]周杰伦 - 稻香
[00:03.33]词：周杰伦
[00:05.76]曲：周杰伦
[00:09.86]对这个世界如果你有太多的抱怨
[00:13.96]跌倒了就不敢继续往前走
[00:18.10]为什么人要这么的脆弱 堕落"#;

        let (lines, metadata) = LrcParser::parse_document(lrc_content);

        assert_eq!(metadata.len(), 4);
        assert_eq!(metadata.get("ar").map(String::as_str), Some("周杰伦"));
        assert_eq!(metadata.get("ti").map(String::as_str), Some("稻香"));

        assert_eq!(lines.len(), 6);
        assert!(close(lines[0].time, 0.0));
        assert_eq!(lines[0].text, "周杰伦 - 稻香");
        assert!(close(lines[1].time, 3.33));

        for i in 1..lines.len() {
            assert!(lines[i].time > lines[i - 1].time);
        }
    }

    #[test]
    fn test_fraction_padding() {
        let lines = LrcParser::parse("[01:02.5]hello\n[01:02.12]hi\n[01:02.123]hey");
        assert_eq!(lines.len(), 3);
        assert!(close(lines[0].time, 62.12));
        assert_eq!(lines[0].text, "hi");
        assert!(close(lines[1].time, 62.123));
        assert!(close(lines[2].time, 62.5));
        assert_eq!(lines[2].text, "hello");
    }

    #[test]
    fn test_tag_without_fraction() {
        let lines = LrcParser::parse("[03:07]plain");
        assert_eq!(lines.len(), 1);
        assert!(close(lines[0].time, 187.0));
    }

    #[test]
    fn test_multiple_tags_share_text() {
        let lines = LrcParser::parse("[00:00]a[00:10]a");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "aa");
        assert_eq!(lines[1].text, "aa");
        assert!(close(lines[0].time, 0.0));
        assert!(close(lines[1].time, 10.0));

        // 整行去掉标签后的文本属于每一个标签
        let lines = LrcParser::parse("[00:01]ab[00:02]cd");
        let parsed: Vec<_> = lines.iter().map(|l| (l.time, l.text.as_str())).collect();
        assert_eq!(parsed, vec![(1.0, "abcd"), (2.0, "abcd")]);

        let lines = LrcParser::parse("[00:01]hello[00:02]");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.text == "hello"));
        assert!(close(lines[1].time, 2.0));

        let lines = LrcParser::parse("intro [00:03]world");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "intro world");
        assert!(close(lines[0].time, 3.0));

        let chorus = LrcParser::parse("[00:20.00][01:20.00]副歌\n[00:30.00]主歌");
        let texts: Vec<_> = chorus.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["副歌", "主歌", "副歌"]);
    }

    #[test]
    fn test_empty_text_dropped() {
        assert!(LrcParser::parse("[00:05.00]   ").is_empty());
        assert!(LrcParser::parse("[00:05.00][00:06.00]").is_empty());
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert!(LrcParser::parse("").is_empty());
        assert!(LrcParser::parse("没有时间标签的一行\n[xx:yy]坏标签").is_empty());
    }

    #[test]
    fn test_stable_order_and_dedup() {
        let lines = LrcParser::parse("[00:01]first\n[00:01]second\n[00:01]first\n[00:00]zero");
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["zero", "first", "second"]);
    }

    #[test]
    fn test_offset_applied() {
        let (lines, _) = LrcParser::parse_document("[offset:500]\n[00:00.20]a\n[00:02.00]b");
        assert!(close(lines[0].time, 0.0));
        assert!(close(lines[1].time, 1.5));
    }
}
