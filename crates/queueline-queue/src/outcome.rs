//! How a turn ended.

use std::fmt;

use queueline_protocol::Turn;

/// The state of a turn, derived from its completion time and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnOutcome {
    /// Still in the queue (no completion time).
    Pending,
    /// The store served the customer.
    Fulfilled,
    /// The customer or the store canceled.
    Canceled,
    /// The customer didn't show up when called.
    NoShow,
    /// Completed, but zero or several outcome flags are set. The server
    /// shouldn't produce this; it's kept distinct instead of guessed.
    Unresolved,
}

impl TurnOutcome {
    pub fn classify(turn: &Turn) -> Self {
        if turn.completion_time.is_none() {
            return Self::Pending;
        }

        let flags = [
            (turn.fulfilled_successfully, Self::Fulfilled),
            (turn.canceled, Self::Canceled),
            (turn.user_did_not_present, Self::NoShow),
        ];
        let mut set = flags
            .into_iter()
            .filter(|(flag, _)| flag.unwrap_or(false))
            .map(|(_, outcome)| outcome);

        match (set.next(), set.next()) {
            (Some(outcome), None) => outcome,
            _ => Self::Unresolved,
        }
    }

    /// Whether the turn has left the queue.
    pub fn is_closed(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Status text for the seller's history list.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Waiting",
            Self::Fulfilled => "No problems",
            Self::Canceled => "Cancelled",
            Self::NoShow => "User did not present",
            Self::Unresolved => "Unknown outcome",
        }
    }
}

impl fmt::Display for TurnOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
