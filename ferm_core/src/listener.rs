//! Control channel: one-line text commands over a Unix socket.
//!
//! | line            | effect                                         |
//! |-----------------|------------------------------------------------|
//! | `q`             | stop listening; the daemon shuts down          |
//! | `v`             | reply with the version string                  |
//! | `p<unit><path>` | start the programme at `path` on an idle unit  |
//! | `s<unit>`       | stop the unit's programme                      |
//! | `i<unit>`       | reply with the unit's status                   |
//!
//! `<unit>` is a single digit. Anything else is ignored without a reply.
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::command::{Command, UnitHandle, UnitStatus};
use crate::util::format_ts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Quit,
    Version,
    Start { unit: usize, path: PathBuf },
    Stop { unit: usize },
    Info { unit: usize },
}

/// Decode one command line; `None` for anything malformed.
pub fn parse_request(line: &str) -> Option<Request> {
    let line = line.trim_end_matches(['\r', '\n']);
    let op = line.chars().next()?;
    let unit = || -> Option<usize> {
        let d = line.chars().nth(1)?.to_digit(10)?;
        usize::try_from(d).ok()
    };
    match op {
        'q' => Some(Request::Quit),
        'v' => Some(Request::Version),
        'p' => {
            let unit = unit()?;
            let path = line.get(2..)?.trim();
            if path.is_empty() {
                return None;
            }
            Some(Request::Start {
                unit,
                path: PathBuf::from(path),
            })
        }
        's' => Some(Request::Stop { unit: unit()? }),
        'i' => Some(Request::Info { unit: unit()? }),
        _ => None,
    }
}

/// What the server does after handling a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to send.
    Silent,
    Line(String),
    /// Close the channel and shut the daemon down.
    Quit,
}

/// How a client session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Disconnected,
}

pub struct ControlServer {
    units: Vec<Arc<UnitHandle>>,
    version: String,
}

impl ControlServer {
    pub fn new(units: Vec<Arc<UnitHandle>>, version: impl Into<String>) -> Self {
        Self {
            units,
            version: version.into(),
        }
    }

    fn unit(&self, index: usize) -> Option<&UnitHandle> {
        let u = self.units.get(index).map(Arc::as_ref);
        if u.is_none() {
            debug!(unit = index, "command for unknown unit ignored");
        }
        u
    }

    pub fn handle_line(&self, line: &str) -> Reply {
        match parse_request(line) {
            Some(req) => self.handle(req),
            None => {
                debug!(line = line.trim_end(), "unrecognised command ignored");
                Reply::Silent
            }
        }
    }

    pub fn handle(&self, req: Request) -> Reply {
        match req {
            Request::Quit => {
                info!("quit requested on control channel");
                Reply::Quit
            }
            Request::Version => Reply::Line(self.version.clone()),
            Request::Start { unit, path } => {
                let Some(handle) = self.unit(unit) else {
                    return Reply::Silent;
                };
                if handle.status().is_running() {
                    debug!(unit, "start ignored; programme already loaded");
                    return Reply::Silent;
                }
                let path = match std::path::absolute(&path) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(unit, path = %path.display(), error = %e, "cannot resolve programme path");
                        return Reply::Silent;
                    }
                };
                info!(unit, path = %path.display(), "start requested");
                let reply = format!("Fermenter {unit} starting {}", path.display());
                handle.post(Command::Start(path));
                Reply::Line(reply)
            }
            Request::Stop { unit } => {
                let Some(handle) = self.unit(unit) else {
                    return Reply::Silent;
                };
                info!(unit, "stop requested");
                handle.post(Command::Stop);
                Reply::Line(format!("Fermenter {unit} stopping"))
            }
            Request::Info { unit } => {
                let Some(handle) = self.unit(unit) else {
                    return Reply::Silent;
                };
                Reply::Line(match handle.status() {
                    UnitStatus::Idle => format!("Fermenter {unit} idle"),
                    UnitStatus::Running { source, started_at } => format!(
                        "Fermenter {unit} running {} since {}",
                        source.display(),
                        format_ts(started_at)
                    ),
                })
            }
        }
    }

    /// Serve one client until it disconnects or asks to quit.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> SessionEnd {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return SessionEnd::Disconnected,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!(error = %e, "control channel read failed");
                    return SessionEnd::Disconnected;
                }
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                debug!(len = buf.len(), "non-UTF-8 command ignored");
                continue;
            };
            match self.handle_line(line) {
                Reply::Silent => {}
                Reply::Quit => return SessionEnd::Quit,
                Reply::Line(text) => {
                    if let Err(e) = writeln!(writer, "{text}").and_then(|()| writer.flush()) {
                        debug!(error = %e, "control channel peer went away");
                        return SessionEnd::Disconnected;
                    }
                }
            }
        }
    }

    /// Bind the control socket, replacing a stale one left by an earlier run.
    pub fn bind(socket: &Path) -> std::io::Result<UnixListener> {
        if let Some(dir) = socket.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        match std::fs::remove_file(socket) {
            Ok(()) => debug!(socket = %socket.display(), "removed stale socket"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let listener = UnixListener::bind(socket)?;
        info!(socket = %socket.display(), "control channel listening");
        Ok(listener)
    }

    /// Serve clients one after another until one sends `q`.
    pub fn accept_loop(&self, listener: &UnixListener) {
        for conn in listener.incoming() {
            let stream = match conn {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };
            let reader = match stream.try_clone() {
                Ok(r) => BufReader::new(r),
                Err(e) => {
                    warn!(error = %e, "cannot split control connection");
                    continue;
                }
            };
            debug!("control client connected");
            match self.serve(reader, stream) {
                SessionEnd::Quit => return,
                SessionEnd::Disconnected => debug!("control client disconnected"),
            }
        }
    }
}
