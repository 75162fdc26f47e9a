//! Deferred driver commands.
//!
//! A controller in [`WriteMode::Deferred`](crate::WriteMode::Deferred) does
//! not call its driver inline. Commands are queued here in scheduling order
//! and executed when the owner drains the controller with
//! [`ServoController::run_pending`](crate::ServoController::run_pending).

use std::collections::VecDeque;

/// One driver call waiting for the next drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    /// Write a pulse width. Deduplication already happened when it was queued.
    Write {
        /// Target channel
        channel: usize,
        /// Pulse width to emit
        pulse_width: i32,
    },
    /// Enable a channel and clear its disabled flag.
    Enable(usize),
    /// Disable a channel and set its disabled flag.
    Disable(usize),
}

impl PendingCommand {
    /// Channel the command targets.
    #[must_use]
    pub const fn channel(&self) -> usize {
        match *self {
            Self::Write { channel, .. } | Self::Enable(channel) | Self::Disable(channel) => {
                channel
            }
        }
    }
}

/// FIFO of [`PendingCommand`]s.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    commands: VecDeque<PendingCommand>,
}

impl PendingQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `command` after everything already queued.
    pub fn push(&mut self, command: PendingCommand) {
        self.commands.push_back(command);
    }

    /// Take every queued command, oldest first.
    pub fn take_all(&mut self) -> Vec<PendingCommand> {
        self.commands.drain(..).collect()
    }

    /// Drop every queued command and report how many were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.commands.len();
        self.commands.clear();
        dropped
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Queued commands, oldest first, without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &PendingCommand> {
        self.commands.iter()
    }
}
