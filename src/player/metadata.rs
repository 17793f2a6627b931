use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::MimeType;
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::lyrics::providers::LyricsRequest;
use crate::lyrics::{
    CoverArt, LyricsResolver, ResolvedLyrics, TagBag, TxxxField, TxxxFrame, UsltField,
};

/// 标签读取结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    pub tags: TagBag,
    /// 音频时长（秒），未知时为 0
    pub duration_secs: f64,
}

/// 音频标签来源
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn read_tags(&self, path: &Path) -> Result<TrackTags>;
}

/// 基于 lofty 的标签读取
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyMetadata;

#[async_trait]
impl MetadataSource for LoftyMetadata {
    async fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        let path = path.to_path_buf();
        // lofty 是同步 IO，放到阻塞线程池
        tokio::task::spawn_blocking(move || read_with_lofty(&path)).await?
    }
}

fn read_with_lofty(path: &Path) -> Result<TrackTags> {
    let tagged = Probe::open(path)?
        .guess_file_type()
        .map_err(|e| PlayerError::io(path, e))?
        .read()?;

    let duration_secs = tagged.properties().duration().as_secs_f64();
    let tags = tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .map(tag_bag)
        .unwrap_or_default();

    Ok(TrackTags {
        tags,
        duration_secs,
    })
}

fn mime_name(mime: Option<&MimeType>) -> String {
    mime.map_or("application/octet-stream", MimeType::as_str)
        .to_string()
}

/// 把 lofty 的通用标签整理成 TagBag
fn tag_bag(tag: &Tag) -> TagBag {
    let picture = tag.pictures().first().map(|p| CoverArt {
        format: mime_name(p.mime_type()),
        data: p.data().to_vec(),
    });

    // 自定义文本帧（ID3v2 TXXX 等）在 lofty 中以未知键出现
    let txxx: Vec<Option<TxxxFrame>> = tag
        .items()
        .filter_map(|item| match item.key() {
            ItemKey::Unknown(description) => Some(Some(TxxxFrame {
                description: Some(description.clone()),
                data: item.value().text().map(str::to_string),
            })),
            _ => None,
        })
        .collect();

    TagBag {
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        picture,
        lyrics: None,
        uslt: tag
            .get_string(&ItemKey::Lyrics)
            .map(|s| UsltField::Text(s.to_string())),
        txxx: (!txxx.is_empty()).then_some(TxxxField::List(txxx)),
    }
}

/// 曲目信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    /// 封面 MIME 类型
    pub cover: Option<String>,
    pub duration_secs: f64,
}

/// 后台加载完成的曲目
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrack {
    pub info: TrackInfo,
    pub lyrics: Option<ResolvedLyrics>,
}

fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Null".to_string())
}

/// 读取曲目标签并查找歌词
///
/// 文件不可读时返回错误；标签读取失败只降级为文件名标题，歌词仍会尝试外部来源。
pub async fn load_track(
    path: PathBuf,
    metadata: &dyn MetadataSource,
    resolver: &LyricsResolver,
) -> Result<LoadedTrack> {
    tokio::fs::metadata(&path)
        .await
        .map_err(|e| PlayerError::io(&path, e))?;

    let tags = match metadata.read_tags(&path).await {
        Ok(tags) => Some(tags),
        Err(e) => {
            warn!("读取 {:?} 的标签失败: {}", path, e);
            None
        }
    };

    let tag_bag = tags.as_ref().map(|t| &t.tags);
    let title = tag_bag
        .and_then(|t| t.title.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title(&path));

    let info = TrackInfo {
        title,
        artist: tag_bag.and_then(|t| t.artist.clone()),
        cover: tag_bag.and_then(|t| t.picture.as_ref().map(|p| p.format.clone())),
        duration_secs: tags.as_ref().map_or(0.0, |t| t.duration_secs),
        path,
    };
    debug!("曲目信息: {:?}", info);

    let lyrics = resolver
        .resolve(&LyricsRequest {
            audio_path: &info.path,
            tags: tag_bag,
        })
        .await;
    if lyrics.is_none() {
        info!("{} 没有可用的歌词", info.title);
    }

    Ok(LoadedTrack { info, lyrics })
}
