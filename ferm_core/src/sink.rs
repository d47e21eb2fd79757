//! Per-unit CSV temperature logs with generation rotation.
//!
//! Generation 0 (`fermenter<N>.0.csv`) is the active file; older runs are
//! shifted to `.1`, `.2`, ... when a new programme starts.
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ferm_traits::Timestamp;
use tracing::{debug, trace};

use crate::error::SinkError;

pub const HEADER: [&str; 4] = ["Time", "Actual", "Desired", "Heat"];

/// One sample row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogEntry {
    pub time: Timestamp,
    pub actual: f32,
    pub desired: f32,
    pub heat: bool,
}

#[derive(Debug, Clone)]
pub struct LogSink {
    dir: PathBuf,
}

impl LogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, unit: usize, generation: u32) -> PathBuf {
        self.dir.join(format!("fermenter{unit}.{generation}.csv"))
    }

    /// Shift generations up by one, dropping anything past `max_generations`,
    /// and leave an empty generation 0 behind.
    pub fn rotate(&self, unit: usize, max_generations: u32) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        remove_if_present(&self.path_for(unit, max_generations))?;
        for g in (0..max_generations).rev() {
            let from = self.path_for(unit, g);
            match fs::rename(&from, self.path_for(unit, g + 1)) {
                Ok(()) => trace!(unit, generation = g, "log generation shifted"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        File::create(self.path_for(unit, 0))?;
        debug!(unit, max_generations, "logs rotated");
        Ok(())
    }

    /// Open generation 0 for appending; the header goes into new or empty files only.
    pub fn open(&self, unit: usize) -> Result<LogHandle, SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(unit, 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let fresh = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            writer.write_record(HEADER)?;
            writer.flush()?;
        }
        debug!(unit, path = %path.display(), fresh, "log opened");
        Ok(LogHandle { writer, path })
    }
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Open log file of one running unit. Dropping it closes the file.
pub struct LogHandle {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl core::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LogHandle").field("path", &self.path).finish()
    }
}

impl LogHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one row and flush it straight to the file.
    pub fn append(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        self.writer.write_record([
            entry.time.to_string(),
            format!("{:.3}", entry.actual),
            format!("{:.3}", entry.desired),
            u8::from(entry.heat).to_string(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}
