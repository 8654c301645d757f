use channel_core::domain::{ChannelQuery, ImageKind, RunStamp, FILE_PREFIX};
use channel_core::ports::{Result, RunJournal};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Filesystem implementation of the RunJournal trait
///
/// Owns the append-only log file and the per-run result file. Both are
/// released by `shutdown` or, failing that, on drop.
pub struct FileJournal {
    output_dir: PathBuf,
    file_key: String,
    stamp: RunStamp,
    log_file: Option<File>,
    result_file: Option<BufWriter<File>>,
}

/// `channel_<id>.log`
pub fn log_file_name(file_key: &str) -> String {
    format!("{}_{}.log", FILE_PREFIX, file_key)
}

/// `channel_<id>_<stamp>.txt`
pub fn result_file_name(file_key: &str, file_stamp: &str) -> String {
    format!("{}_{}_{}.txt", FILE_PREFIX, file_key, file_stamp)
}

/// `channel_<id>_<stamp>_<kind>.jpeg`, whatever the actual encoding
pub fn image_file_name(file_key: &str, file_stamp: &str, kind: ImageKind) -> String {
    format!("{}_{}_{}_{}.jpeg", FILE_PREFIX, file_key, file_stamp, kind.suffix())
}

impl FileJournal {
    /// Opens the log file (append) and the result file (truncate) for a run.
    /// If the result file cannot be created the log handle is dropped with the error.
    pub fn open(output_dir: impl Into<PathBuf>, query: &ChannelQuery, stamp: RunStamp) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;

        let file_key = query.file_key();
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_dir.join(log_file_name(&file_key)))?;
        let result_file = File::create(output_dir.join(result_file_name(&file_key, &stamp.file)))?;

        debug!(dir = %output_dir.display(), key = %file_key, run = %stamp.database, "Run files opened");

        Ok(Self {
            output_dir,
            file_key,
            stamp,
            log_file: Some(log_file),
            result_file: Some(BufWriter::new(result_file)),
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(log_file_name(&self.file_key))
    }

    pub fn result_path(&self) -> PathBuf {
        self.output_dir.join(result_file_name(&self.file_key, &self.stamp.file))
    }

    pub fn image_path(&self, kind: ImageKind) -> PathBuf {
        self.output_dir
            .join(image_file_name(&self.file_key, &self.stamp.file, kind))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn closed(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{} is already closed", what))
}

impl RunJournal for FileJournal {
    fn log(&mut self, message: &str) -> Result<()> {
        let file = self.log_file.as_mut().ok_or_else(|| closed("log file"))?;
        writeln!(file, "{} : {}", self.stamp.display, message)?;
        file.flush()?;
        Ok(())
    }

    fn write_result(&mut self, text: &str) -> Result<()> {
        let file = self.result_file.as_mut().ok_or_else(|| closed("result file"))?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    fn save_image(&mut self, kind: ImageKind, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.image_path(kind);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    fn shutdown(&mut self) {
        let closing = [
            self.log_file.take().map(|mut f| f.flush()),
            self.result_file.take().map(|mut f| f.flush()),
        ];

        for err in closing.into_iter().flatten().filter_map(|r| r.err()) {
            println!("Error cleaning up : {}", err);
            warn!("Error cleaning up : {}", err);
        }
    }
}

impl Drop for FileJournal {
    fn drop(&mut self) {
        self.shutdown();
    }
}
