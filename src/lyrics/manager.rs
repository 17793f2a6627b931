use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::lyrics::providers::{LyricsProvider, LyricsRequest};
use crate::lyrics::Lyrics;

/// 查找结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLyrics {
    pub lyrics: Lyrics,
    /// 提供者名称
    pub source: String,
}

/// 按优先级依次询问歌词提供者
#[derive(Clone)]
pub struct LyricsResolver {
    providers: Arc<Vec<Arc<dyn LyricsProvider>>>,
}

impl LyricsResolver {
    pub fn new(providers: Vec<Arc<dyn LyricsProvider>>) -> Self {
        Self {
            providers: Arc::new(providers),
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// 返回第一个能解析出至少一行歌词的来源
    pub async fn resolve(&self, request: &LyricsRequest<'_>) -> Option<ResolvedLyrics> {
        for provider in self.providers.iter() {
            debug!("尝试从 {} 获取歌词", provider.name());
            match provider.lyrics_text(request).await {
                Ok(Some(text)) => {
                    let lyrics = Lyrics::from_lrc(&text, provider.name());
                    if lyrics.is_empty() {
                        debug!("{} 的歌词没有可用的时间标签，尝试下一个提供者", provider.name());
                        continue;
                    }
                    info!("使用 {} 歌词，共{}行", provider.name(), lyrics.len());
                    return Some(ResolvedLyrics {
                        lyrics,
                        source: provider.name().to_string(),
                    });
                }
                Ok(None) => {
                    debug!("{} 未找到歌词，尝试下一个提供者", provider.name());
                }
                Err(e) => {
                    warn!("{} 获取歌词失败: {}", provider.name(), e);
                }
            }
        }

        debug!("所有提供者均未找到歌词");
        None
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::*;
    use crate::lyrics::providers::EmbeddedProvider;
    use crate::lyrics::{LyricsField, TagBag};

    struct Fixed(&'static str, Option<&'static str>);

    #[async_trait]
    impl LyricsProvider for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn lyrics_text(&self, _request: &LyricsRequest<'_>) -> Result<Option<String>> {
            Ok(self.1.map(str::to_string))
        }
    }

    struct Failing;

    #[async_trait]
    impl LyricsProvider for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn lyrics_text(&self, _request: &LyricsRequest<'_>) -> Result<Option<String>> {
            Err(anyhow!("boom"))
        }
    }

    fn request<'a>(tags: Option<&'a TagBag>) -> LyricsRequest<'a> {
        LyricsRequest {
            audio_path: Path::new("/nonexistent/song.mp3"),
            tags,
        }
    }

    #[tokio::test]
    async fn test_first_usable_source_wins() {
        let resolver = LyricsResolver::new(vec![
            Arc::new(Failing),
            Arc::new(Fixed("none", None)),
            Arc::new(Fixed("plain", Some("no timestamps here"))),
            Arc::new(Fixed("good", Some("[00:01.00]hello"))),
            Arc::new(Fixed("later", Some("[00:02.00]ignored"))),
        ]);

        let resolved = resolver.resolve(&request(None)).await.unwrap();
        assert_eq!(resolved.source, "good");
        assert_eq!(resolved.lyrics.lines[0].text, "hello");
        assert_eq!(resolved.lyrics.metadata.source, "good");
    }

    #[tokio::test]
    async fn test_embedded_provider_reads_tags() {
        let tags = TagBag {
            lyrics: Some(LyricsField::Text("[00:03.00]嵌入歌词".into())),
            ..TagBag::default()
        };
        let resolver = LyricsResolver::new(vec![Arc::new(EmbeddedProvider)]);

        let resolved = resolver.resolve(&request(Some(&tags))).await.unwrap();
        assert_eq!(resolved.lyrics.lines[0].text, "嵌入歌词");
        assert!(resolver.resolve(&request(None)).await.is_none());
    }
}
