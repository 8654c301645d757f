use channel_core::domain::{ChannelQuery, ChannelSnapshot};
use channel_core::error::ReportError;
use channel_core::ports::{ChannelSource, ImageSource, Result};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::{debug, info};

pub mod payload;

pub use payload::parse_channel_response;

pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3/channels";

/// Data parts requested from the channels endpoint
pub const CHANNEL_PARTS: &str = "brandingSettings,contentDetails,contentOwnerDetails,id,localizations,snippet,statistics,status,topicDetails";

/// YouTube Data API implementation of the ChannelSource and ImageSource traits
#[derive(Clone)]
pub struct YoutubeClient {
    http: Client,
    api_url: String,
}

impl YoutubeClient {
    /// Creates a client against the public API endpoint
    pub fn new() -> Result<Self> {
        Self::with_api_url(DEFAULT_API_URL)
    }

    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("channel-reporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }

    /// Builds the metadata request URL for a query
    pub fn metadata_url(&self, query: &ChannelQuery) -> Result<Url> {
        Url::parse_with_params(
            &self.api_url,
            &[
                ("key", query.api_key.as_str()),
                ("id", query.channel_id.as_str()),
                ("part", CHANNEL_PARTS),
            ],
        )
        .map_err(|e| ReportError::Transport {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Renders a URL for logs with the API key masked.
/// Query values are shown decoded so `part` keeps its commas.
pub fn redact_key(url: &Url) -> String {
    let query: Vec<String> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "key" { "***".into() } else { v };
            format!("{}={}", k, value)
        })
        .collect();

    let mut base = url.clone();
    base.set_query(None);
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query.join("&"))
    }
}

impl ChannelSource for YoutubeClient {
    fn fetch_channel(&self, query: &ChannelQuery) -> Result<ChannelSnapshot> {
        let url = self.metadata_url(query)?;
        let shown = redact_key(&url);
        info!(channel = %query.channel_id, url = %shown, "Requesting channel metadata");

        // without_url: reqwest errors would otherwise echo the key
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| ReportError::Transport {
                url: shown.clone(),
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| ReportError::Transport {
            url: shown.clone(),
            reason: e.without_url().to_string(),
        })?;

        if status != StatusCode::OK {
            return Err(ReportError::HttpStatus {
                url: shown,
                status: status.as_u16(),
                body,
            });
        }

        debug!(bytes = body.len(), "Channel metadata received");
        parse_channel_response(&body, query)
    }
}

impl ImageSource for YoutubeClient {
    fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        let transport = |e: reqwest::Error| ReportError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let mut response = self.http.get(url).send().map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ReportError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        // Body is read chunk by chunk instead of buffered by reqwest first
        let mut bytes = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
        response.copy_to(&mut bytes).map_err(transport)?;
        debug!(url, bytes = bytes.len(), "Image downloaded");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn query() -> ChannelQuery {
        ChannelQuery::new("UC123", "secret-key", chrono_tz::Europe::Paris)
    }

    fn client(server: &MockServer) -> YoutubeClient {
        YoutubeClient::with_api_url(server.url("/youtube/v3/channels")).unwrap()
    }

    fn channel_body() -> serde_json::Value {
        json!({
            "items": [{
                "snippet": {
                    "title": "Example",
                    "description": "An example channel",
                    "customUrl": "@example",
                    "publishedAt": "2013-04-18T17:45:10Z",
                    "thumbnails": { "high": { "url": "https://yt3.test/high.jpg" } }
                },
                "statistics": {
                    "viewCount": "10",
                    "subscriberCount": "20",
                    "videoCount": "30"
                },
                "brandingSettings": {}
            }]
        })
    }

    #[test]
    fn metadata_url_carries_key_id_and_parts() {
        let client = YoutubeClient::new().unwrap();
        let url = client.metadata_url(&query()).unwrap();

        assert!(url.as_str().starts_with(DEFAULT_API_URL));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("key".to_string(), "secret-key".to_string()),
                ("id".to_string(), "UC123".to_string()),
                ("part".to_string(), CHANNEL_PARTS.to_string()),
            ]
        );
    }

    #[test]
    fn redact_key_masks_only_the_key() {
        let url = Url::parse("https://api.test/channels?key=abc&id=UC1").unwrap();
        let shown = redact_key(&url);

        assert!(!shown.contains("abc"));
        assert_eq!(shown, "https://api.test/channels?key=***&id=UC1");
    }

    #[test]
    fn redact_key_keeps_part_readable() {
        let client = YoutubeClient::new().unwrap();
        let shown = redact_key(&client.metadata_url(&query()).unwrap());

        assert_eq!(
            shown,
            format!("{}?key=***&id=UC123&part={}", DEFAULT_API_URL, CHANNEL_PARTS)
        );
    }

    #[test]
    fn fetch_channel_parses_success_response() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/youtube/v3/channels")
                .query_param("key", "secret-key")
                .query_param("id", "UC123")
                .query_param("part", CHANNEL_PARTS);
            then.status(200).json_body(channel_body());
        });

        let snapshot = client(&server).fetch_channel(&query()).unwrap();

        mock.assert();
        assert_eq!(snapshot.channel_url(), "https://www.youtube.com/@example");
        assert_eq!(snapshot.video_count, "30");
        assert_eq!(snapshot.banner_url, None);
    }

    #[test]
    fn fetch_channel_reports_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/youtube/v3/channels");
            then.status(403).body("quotaExceeded");
        });

        let err = client(&server).fetch_channel(&query()).unwrap_err();

        match err {
            ReportError::HttpStatus { url, status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "quotaExceeded");
                assert!(!url.contains("secret-key"));
                assert!(url.contains("id=UC123"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fetch_channel_transport_error_hides_key() {
        let client = YoutubeClient::with_api_url("http://127.0.0.1:1/channels").unwrap();

        let err = client.fetch_channel(&query()).unwrap_err();

        assert!(matches!(err, ReportError::Transport { .. }));
        assert!(!err.to_string().contains("secret-key"));
    }

    #[test]
    fn download_image_returns_body_bytes() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/thumb.jpg");
            then.status(200)
                .header("content-type", "image/png")
                .body(&[0x89u8, b'P', b'N', b'G'][..]);
        });

        let bytes = client(&server)
            .download_image(&server.url("/thumb.jpg"))
            .unwrap();

        mock.assert();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn download_image_reads_large_body_completely() {
        let server = MockServer::start();
        let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        server.mock(|when, then| {
            when.method(GET).path("/banner");
            then.status(200).body(&body);
        });

        let bytes = client(&server).download_image(&server.url("/banner")).unwrap();

        assert_eq!(bytes.len(), body.len());
        assert_eq!(bytes, body);
    }

    #[test]
    fn download_image_non_200_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/banner.jpg");
            then.status(404);
        });

        let url = server.url("/banner.jpg");
        let err = client(&server).download_image(&url).unwrap_err();

        assert!(matches!(err, ReportError::HttpStatus { status: 404, .. }));
        assert!(err.to_string().contains(&url));
    }
}
