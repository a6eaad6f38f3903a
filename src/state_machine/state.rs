use std::fmt;

use serde::{Deserialize, Serialize};

/// States of a single delivery attempt.
///
/// Each attempt flows through: IDLE → COMPOSING → PACKAGING → SENDING → DELIVERED | FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    Idle,
    Composing,
    Packaging,
    Sending,
    Delivered,
    Failed,
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryState::Idle => write!(f, "IDLE"),
            DeliveryState::Composing => write!(f, "COMPOSING"),
            DeliveryState::Packaging => write!(f, "PACKAGING"),
            DeliveryState::Sending => write!(f, "SENDING"),
            DeliveryState::Delivered => write!(f, "DELIVERED"),
            DeliveryState::Failed => write!(f, "FAILED"),
        }
    }
}

impl DeliveryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryState::Delivered | DeliveryState::Failed)
    }

    /// Whether `next` is a legal successor of this state.
    ///
    /// Any in-flight stage may fail; only SENDING may end in DELIVERED.
    pub fn can_advance_to(self, next: DeliveryState) -> bool {
        use DeliveryState::*;
        matches!(
            (self, next),
            (Idle, Composing)
                | (Composing, Packaging)
                | (Packaging, Sending)
                | (Sending, Delivered)
                | (Composing | Packaging | Sending, Failed)
        )
    }
}

/// Records the path one attempt took through [`DeliveryState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptTrace {
    state: DeliveryState,
    history: Vec<DeliveryState>,
}

impl Default for AttemptTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptTrace {
    pub fn new() -> Self {
        Self {
            state: DeliveryState::Idle,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Move to `next`. Illegal transitions leave the trace untouched and return `false`.
    pub fn advance(&mut self, next: DeliveryState) -> bool {
        if !self.state.can_advance_to(next) {
            return false;
        }
        self.history.push(self.state);
        self.state = next;
        true
    }

    /// All visited states, including the current one.
    pub fn path(&self) -> Vec<DeliveryState> {
        let mut path = self.history.clone();
        path.push(self.state);
        path
    }
}
