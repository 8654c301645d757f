use tracing::{error, info};

use crate::domain::{ChannelQuery, ChannelSnapshot, ImageKind};
use crate::ports::{ChannelSource, ImageSource, Result, RunJournal};
use crate::utils::format_in_timezone;

pub const MSG_START: &str = "Starting program";
pub const MSG_OK: &str = "Execution was OK";
pub const MSG_ERRORS: &str = "Execution had errors";
pub const MSG_END: &str = "Ending program";

/// Stage of the run, only used to label failure lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Metadata,
    Images,
    Report,
}

impl Step {
    fn label(&self) -> &'static str {
        match self {
            Step::Images => "idchannel",
            Step::Metadata | Step::Report => "channel",
        }
    }
}

/// Application service producing the report of one channel
pub struct ChannelReportService {
    channel_source: Box<dyn ChannelSource>,
    image_source: Box<dyn ImageSource>,
    journal: Box<dyn RunJournal>,
    step: Step,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub snapshot: ChannelSnapshot,
    pub report: String,
    pub banner_saved: bool,
}

impl ChannelReportService {
    /// Creates a new ChannelReportService with the given dependencies
    pub fn new(
        channel_source: Box<dyn ChannelSource>,
        image_source: Box<dyn ImageSource>,
        journal: Box<dyn RunJournal>,
    ) -> Self {
        Self {
            channel_source,
            image_source,
            journal,
            step: Step::Metadata,
        }
    }

    /// Runs fetch, downloads and report writing in order.
    /// Any failure, including one while writing the closing log lines, is
    /// logged and ends the run through `abort_run`; the journal is shut down
    /// on every path.
    pub fn execute(&mut self, query: &ChannelQuery) -> Result<RunSummary> {
        self.step = Step::Metadata;
        let outcome = self
            .note(MSG_START)
            .and_then(|_| self.collect(query))
            .and_then(|summary| {
                self.note(MSG_OK)?;
                self.note(MSG_END)?;
                Ok(summary)
            });

        match outcome {
            Ok(summary) => {
                self.journal.shutdown();
                Ok(summary)
            }
            Err(err) => {
                let detail = format!("[×] {}={} {}", self.step.label(), query.channel_id, err);
                error!(network = err.is_network(), "{}", detail);
                if let Err(log_err) = self.journal.log(&detail) {
                    error!("Could not write log entry: {}", log_err);
                }
                self.abort_run();
                Err(err)
            }
        }
    }

    fn collect(&mut self, query: &ChannelQuery) -> Result<RunSummary> {
        let snapshot = self.channel_source.fetch_channel(query)?;

        self.step = Step::Images;
        let thumbnail = self.image_source.download_image(&snapshot.thumbnail_url)?;
        let path = self.journal.save_image(ImageKind::Thumbnail, &thumbnail)?;
        info!(path = %path.display(), "Saved thumbnail");

        let banner_saved = match &snapshot.banner_url {
            Some(url) => {
                let banner = self.image_source.download_image(url)?;
                let path = self.journal.save_image(ImageKind::Banner, &banner)?;
                info!(path = %path.display(), "Saved banner");
                true
            }
            None => {
                info!(channel = %query.channel_id, "No banner image, skipping");
                false
            }
        };

        self.step = Step::Report;
        let report = render_report(query, &snapshot)?;
        self.journal.write_result(&report)?;
        print!("{}", report);

        Ok(RunSummary {
            snapshot,
            report,
            banner_saved,
        })
    }

    /// Single failure exit: trailing log lines, then shutdown.
    /// The caller turns the returned error into exit code 1.
    fn abort_run(&mut self) {
        for message in [MSG_ERRORS, MSG_END] {
            if let Err(err) = self.note(message) {
                error!("Could not write log entry: {}", err);
            }
        }
        self.journal.shutdown();
    }

    /// Writes a log line and mirrors it on the console
    fn note(&mut self, message: &str) -> Result<()> {
        info!("{}", message);
        self.journal.log(message)
    }
}

/// Formats a channel snapshot into the plain text report
pub fn render_report(query: &ChannelQuery, snapshot: &ChannelSnapshot) -> Result<String> {
    let published = format_in_timezone(
        &snapshot.published_at,
        &query.timezone,
        &query.date_formats.display,
    )?;

    let mut output = String::new();
    output.push_str(&format!(
        "Channel {} id : {}\n\n",
        snapshot.channel_url(),
        snapshot.channel_id
    ));
    output.push_str(&format!("Title : {}\n", snapshot.title));
    output.push_str(&format!("Description : {}\n", snapshot.description));
    output.push_str(&format!("Date : {}\n", published));
    output.push_str(&format!("viewCount : {}\n", snapshot.view_count));
    output.push_str(&format!("subscriberCount : {}\n", snapshot.subscriber_count));
    output.push_str(&format!("videoCount : {}\n\n", snapshot.video_count));

    Ok(output)
}
