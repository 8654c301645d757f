use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;

use crate::ports::Result;
use crate::utils::{format_with, sanitize_filename};

pub const DEFAULT_DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
pub const DEFAULT_DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_FILE_FORMAT: &str = "%d%m%Y%H%M%S";

/// Prefix shared by every file a run produces
pub const FILE_PREFIX: &str = "channel";

/// The three strftime patterns a run renders timestamps with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    /// Used in log lines and for the channel's publish date
    pub display: String,
    pub database: String,
    /// Must only produce characters that are valid in a file name
    pub file: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            display: DEFAULT_DISPLAY_FORMAT.to_string(),
            database: DEFAULT_DB_FORMAT.to_string(),
            file: DEFAULT_FILE_FORMAT.to_string(),
        }
    }
}

/// Immutable input of a run
#[derive(Debug, Clone)]
pub struct ChannelQuery {
    pub channel_id: String,
    pub api_key: String,
    pub timezone: Tz,
    pub date_formats: DateFormats,
}

impl ChannelQuery {
    pub fn new(channel_id: impl Into<String>, api_key: impl Into<String>, timezone: Tz) -> Self {
        Self {
            channel_id: channel_id.into(),
            api_key: api_key.into(),
            timezone,
            date_formats: DateFormats::default(),
        }
    }

    pub fn with_date_formats(mut self, date_formats: DateFormats) -> Self {
        self.date_formats = date_formats;
        self
    }

    /// Channel id as it appears in file names
    pub fn file_key(&self) -> String {
        sanitize_filename(&self.channel_id)
    }
}

/// The run timestamp, rendered once in every configured format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    pub instant: DateTime<Tz>,
    pub display: String,
    pub database: String,
    pub file: String,
}

impl RunStamp {
    pub fn now(query: &ChannelQuery) -> Result<Self> {
        Self::at(Utc::now(), query.timezone, &query.date_formats)
    }

    pub fn at(instant: DateTime<Utc>, timezone: Tz, formats: &DateFormats) -> Result<Self> {
        let local = instant.with_timezone(&timezone);
        Ok(Self {
            display: format_with(&local, &formats.display)?,
            database: format_with(&local, &formats.database)?,
            file: format_with(&local, &formats.file)?,
            instant: local,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Thumbnail,
    Banner,
}

impl ImageKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            ImageKind::Thumbnail => "thumbnail",
            ImageKind::Banner => "banner",
        }
    }
}

/// Channel fields extracted from one metadata response
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSnapshot {
    pub channel_id: String,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<FixedOffset>,
    pub thumbnail_url: String,
    pub banner_url: Option<String>,
    // Counts are passed through verbatim, never parsed
    pub view_count: String,
    pub subscriber_count: String,
    pub video_count: String,
}

impl ChannelSnapshot {
    pub fn channel_url(&self) -> String {
        crate::utils::channel_url(&self.handle)
    }
}
