use crate::domain::{ChannelQuery, ChannelSnapshot, ImageKind};
use crate::error::ReportError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ReportError>;

pub trait ChannelSource {
    // One metadata request, first item only
    fn fetch_channel(&self, query: &ChannelQuery) -> Result<ChannelSnapshot>;
}

pub trait ImageSource {
    fn download_image(&self, url: &str) -> Result<Vec<u8>>;
}

/// Trait for the files a single run owns: log, result and images
/// This is a port (interface) that defines how the core persists a run
pub trait RunJournal {
    /// Appends a timestamped line and makes it durable before returning
    fn log(&mut self, message: &str) -> Result<()>;

    fn write_result(&mut self, text: &str) -> Result<()>;

    fn save_image(&mut self, kind: ImageKind, bytes: &[u8]) -> Result<PathBuf>;

    /// Closes everything. Must not fail and must tolerate repeated calls.
    fn shutdown(&mut self);
}
