//! Wire model of the `channels` endpoint, limited to the fields the report uses

use channel_core::domain::{ChannelQuery, ChannelSnapshot};
use channel_core::error::ReportError;
use channel_core::ports::Result;
use channel_core::utils::{handle_from_custom_url, parse_published_at};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub snippet: Option<Snippet>,
    pub statistics: Option<Statistics>,
    pub branding_settings: Option<BrandingSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    pub custom_url: Option<String>,
    pub published_at: Option<String>,
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnails {
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<Count>,
    pub subscriber_count: Option<Count>,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
    pub video_count: Option<Count>,
}

/// Counts arrive as JSON strings; numbers are accepted too and kept as text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Text(text) => f.write_str(text),
            Count::Number(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BrandingSettings {
    pub image: Option<BrandingImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingImage {
    pub banner_external_url: Option<String>,
}

fn missing(field: &str) -> ReportError {
    ReportError::MalformedPayload(format!("missing field `{}`", field))
}

/// Parses a metadata response body and maps its first item to a snapshot
pub fn parse_channel_response(body: &str, query: &ChannelQuery) -> Result<ChannelSnapshot> {
    let response: ChannelListResponse = serde_json::from_str(body)
        .map_err(|e| ReportError::MalformedPayload(e.to_string()))?;

    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| ReportError::ChannelNotFound(query.channel_id.clone()))?;

    let snippet = item.snippet.ok_or_else(|| missing("snippet"))?;
    let stats = item.statistics.ok_or_else(|| missing("statistics"))?;

    let custom_url = snippet.custom_url.ok_or_else(|| missing("snippet.customUrl"))?;
    let published_raw = snippet
        .published_at
        .ok_or_else(|| missing("snippet.publishedAt"))?;
    let thumbnail_url = snippet
        .thumbnails
        .and_then(|t| t.high)
        .map(|t| t.url)
        .ok_or_else(|| missing("snippet.thumbnails.high.url"))?;

    let banner_url = item
        .branding_settings
        .and_then(|b| b.image)
        .and_then(|i| i.banner_external_url);

    let subscriber_count = match stats.subscriber_count {
        Some(count) => count.to_string(),
        None if stats.hidden_subscriber_count => "hidden".to_string(),
        None => return Err(missing("statistics.subscriberCount")),
    };

    Ok(ChannelSnapshot {
        channel_id: query.channel_id.clone(),
        handle: handle_from_custom_url(&custom_url),
        title: snippet.title.ok_or_else(|| missing("snippet.title"))?,
        description: snippet.description,
        published_at: parse_published_at(&published_raw)?,
        thumbnail_url,
        banner_url,
        view_count: stats
            .view_count
            .ok_or_else(|| missing("statistics.viewCount"))?
            .to_string(),
        subscriber_count,
        video_count: stats
            .video_count
            .ok_or_else(|| missing("statistics.videoCount"))?
            .to_string(),
    })
}
