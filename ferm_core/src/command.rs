//! Per-unit mailbox shared between the control listener and a controller.
//!
//! The listener is the only writer of the command slot and the owning
//! controller its only reader. The controller is the only writer of the
//! status snapshot, which the listener reads to answer queries.
use crossbeam_channel::{self as xch, TrySendError};
use ferm_traits::Timestamp;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load and run the programme at this (absolute) path.
    Start(PathBuf),
    Stop,
}

/// Single-slot command mailbox; a newer command replaces one not yet taken.
#[derive(Debug)]
pub struct CommandSlot {
    tx: xch::Sender<Command>,
    rx: xch::Receiver<Command>,
}

impl Default for CommandSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSlot {
    pub fn new() -> Self {
        let (tx, rx) = xch::bounded(1);
        Self { tx, rx }
    }

    /// Deposit `cmd`, discarding a pending command the controller has not seen yet.
    pub fn post(&self, cmd: Command) {
        let mut cmd = cmd;
        loop {
            match self.tx.try_send(cmd) {
                Ok(()) => return,
                Err(TrySendError::Full(c)) => {
                    if let Ok(old) = self.rx.try_recv() {
                        debug!(?old, new = ?c, "pending command replaced");
                    }
                    cmd = c;
                }
                // Both ends live in self
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Take the pending command, leaving the slot empty.
    pub fn take(&self) -> Option<Command> {
        self.rx.try_recv().ok()
    }
}

/// What a unit is doing, as last published by its controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnitStatus {
    #[default]
    Idle,
    Running {
        source: PathBuf,
        started_at: Timestamp,
    },
}

impl UnitStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Everything about a unit that crosses thread boundaries.
#[derive(Debug)]
pub struct UnitHandle {
    index: usize,
    commands: CommandSlot,
    status: RwLock<UnitStatus>,
}

impl UnitHandle {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            commands: CommandSlot::new(),
            status: RwLock::new(UnitStatus::Idle),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn post(&self, cmd: Command) {
        self.commands.post(cmd);
    }

    pub fn take_command(&self) -> Option<Command> {
        self.commands.take()
    }

    pub fn status(&self) -> UnitStatus {
        match self.status.read() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn publish(&self, status: UnitStatus) {
        match self.status.write() {
            Ok(mut s) => *s = status,
            Err(poisoned) => *poisoned.into_inner() = status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_empties_the_slot() {
        let slot = CommandSlot::new();
        slot.post(Command::Stop);
        assert_eq!(slot.take(), Some(Command::Stop));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn newer_command_wins() {
        let slot = CommandSlot::new();
        slot.post(Command::Start(PathBuf::from("/a")));
        slot.post(Command::Stop);
        assert_eq!(slot.take(), Some(Command::Stop));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn status_round_trips() {
        let unit = UnitHandle::new(1);
        assert_eq!(unit.status(), UnitStatus::Idle);
        unit.publish(UnitStatus::Running {
            source: PathBuf::from("/p"),
            started_at: 5,
        });
        assert!(unit.status().is_running());
    }
}
