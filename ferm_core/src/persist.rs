//! Durable "unit N is running programme S since T" markers.
//!
//! One plain-text file per unit, `<dir>/fermenter<N>.state`, holding a
//! decimal timestamp and the programme path separated by whitespace.
//! The record exists exactly while a unit is running, so a record found at
//! startup means the previous process died mid-run.
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ferm_traits::Timestamp;
use tracing::{debug, warn};

/// What a unit was doing when the record was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub start_time: Timestamp,
    pub source: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, unit: usize) -> PathBuf {
        self.dir.join(format!("fermenter{unit}.state"))
    }

    /// Record a running programme, replacing any earlier record for `unit`.
    pub fn write(&self, unit: usize, start_time: Timestamp, source: &Path) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let body = format!("{start_time} {}\n", source.display());
        write_atomic(&self.path_for(unit), body.as_bytes())?;
        debug!(unit, start_time, source = %source.display(), "run record written");
        Ok(())
    }

    /// Read the record for `unit` and delete it, whatever its contents.
    ///
    /// A record is good for one recovery attempt only. Unreadable or
    /// malformed records are reported and treated as absent.
    pub fn read_and_consume(&self, unit: usize) -> Option<RunRecord> {
        let path = self.path_for(unit);
        let text = match fs::read_to_string(&path) {
            Ok(t) => Some(t),
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(unit, path = %path.display(), error = %e, "cannot read run record");
                None
            }
        };
        self.delete(unit);

        let text = text?;
        let record = parse_record(&text);
        if record.is_none() {
            warn!(unit, path = %path.display(), contents = text.trim(), "discarding corrupt run record");
        }
        record
    }

    /// Remove the record for `unit`; absent records are fine.
    pub fn delete(&self, unit: usize) {
        let path = self.path_for(unit);
        match fs::remove_file(&path) {
            Ok(()) => debug!(unit, "run record removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(unit, path = %path.display(), error = %e, "cannot remove run record"),
        }
    }
}

fn parse_record(text: &str) -> Option<RunRecord> {
    let text = text.trim();
    let (ts, rest) = text.split_once(char::is_whitespace)?;
    let start_time = ts.parse::<Timestamp>().ok()?;
    let source = rest.trim();
    if source.is_empty() {
        return None;
    }
    Some(RunRecord {
        start_time,
        source: PathBuf::from(source),
    })
}

/// Write via a sibling temp file and rename so a crash never leaves half a record.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("state.new");
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_with_spaces() {
        let r = parse_record("1700000000 /srv/brew/my ale.prog\n").unwrap();
        assert_eq!(r.start_time, 1_700_000_000);
        assert_eq!(r.source, PathBuf::from("/srv/brew/my ale.prog"));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record("1700000000"), None);
        assert_eq!(parse_record("yesterday /a/b"), None);
    }
}
