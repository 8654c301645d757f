use channel_core::application::ChannelReportService;
use channel_core::domain::{
    ChannelQuery, DateFormats, RunStamp, DEFAULT_DB_FORMAT, DEFAULT_DISPLAY_FORMAT,
    DEFAULT_FILE_FORMAT,
};
use channel_core::error::ReportError;
use channel_core::ports::Result;
use chrono_tz::Tz;
use clap::Parser;
use file_adapter::FileJournal;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use youtube_adapter::{YoutubeClient, DEFAULT_API_URL};

/// CLI tool to snapshot a YouTube channel's metadata, thumbnail and banner
#[derive(Parser, Debug)]
#[command(name = "channel-reporter")]
#[command(about = "Fetches a YouTube channel's metadata and writes a timestamped report with its images")]
struct Cli {
    /// Channel id ("Share channel" > "Copy channel ID" on YouTube)
    #[arg(short = 'c', long = "channel-id", env = "YOUTUBE_CHANNEL_ID")]
    channel_id: String,

    /// YouTube Data API key
    #[arg(short = 'k', long = "api-key", env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// IANA timezone used for the run timestamp and the publish date
    #[arg(long, default_value = "Europe/Paris", value_parser = parse_timezone)]
    timezone: Tz,

    /// Format of log timestamps and of the publish date
    #[arg(long = "date-format", default_value = DEFAULT_DISPLAY_FORMAT)]
    date_format: String,

    #[arg(long = "db-date-format", default_value = DEFAULT_DB_FORMAT)]
    db_date_format: String,

    /// Format of the timestamp embedded in file names
    #[arg(long = "file-date-format", default_value = DEFAULT_FILE_FORMAT)]
    file_date_format: String,

    /// Directory receiving the log, report and image files
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Channels endpoint of the Data API
    #[arg(long = "api-url", default_value = DEFAULT_API_URL)]
    api_url: String,
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ReportError::UnknownTimezone(name.to_string()))
}

impl Cli {
    fn query(&self) -> ChannelQuery {
        ChannelQuery::new(&self.channel_id, &self.api_key, self.timezone).with_date_formats(
            DateFormats {
                display: self.date_format.clone(),
                database: self.db_date_format.clone(),
                file: self.file_date_format.clone(),
            },
        )
    }
}

/// Computes the run stamp, opens the run files and wires the adapters
fn setup(cli: &Cli, query: &ChannelQuery) -> Result<ChannelReportService> {
    let stamp = RunStamp::now(query)?;
    let journal = FileJournal::open(&cli.output_dir, query, stamp)?;
    let client = YoutubeClient::with_api_url(&cli.api_url)?;

    Ok(ChannelReportService::new(
        Box::new(client.clone()),
        Box::new(client),
        Box::new(journal),
    ))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let query = cli.query();

    // Nothing is logged to the run log if this fails
    let mut service = match setup(&cli, &query) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error during setup: {}", e);
            std::process::exit(1);
        }
    };

    match service.execute(&query) {
        Ok(summary) => {
            info!(
                channel = %summary.snapshot.channel_id,
                banner = summary.banner_saved,
                "Report written to {}",
                cli.output_dir.display()
            );
        }
        Err(_) => {
            // Already logged by the service
            std::process::exit(1);
        }
    }
}
