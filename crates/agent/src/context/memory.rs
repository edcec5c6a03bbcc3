//! Conversation memory: the bounded, ordered log of completed turns.
//!
//! One instance belongs to exactly one dialogue session. It is handed to
//! the engine at construction and only ever cleared by explicit caller
//! action. Overflow drops the oldest turn first.

use carebot_core::message::ConversationTurn;

/// Maximum number of turns retained.
pub const DEFAULT_CAPACITY: usize = 10;

/// Number of recent turns surfaced into a prompt.
pub const DEFAULT_WINDOW: usize = 5;

#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
    capacity: usize,
    enabled: bool,
}

impl ConversationMemory {
    /// Memory with the default capacity. A disabled memory ignores appends.
    pub fn new(enabled: bool) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, enabled)
    }

    /// Memory that retains at most `capacity` turns (minimum 1).
    pub(crate) fn with_capacity(capacity: usize, enabled: bool) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: Vec::with_capacity(capacity + 1),
            capacity,
            enabled,
        }
    }

    /// Record a finished turn, evicting the oldest ones past capacity.
    pub fn append(&mut self, turn: ConversationTurn) {
        if !self.enabled {
            return;
        }
        self.turns.push(turn);
        if self.turns.len() > self.capacity {
            let overflow = self.turns.len() - self.capacity;
            self.turns.drain(..overflow);
        }
    }

    /// The most recent `n` turns (or fewer), oldest first.
    pub fn recent_window(&self, n: usize) -> &[ConversationTurn] {
        if !self.enabled {
            return &[];
        }
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Every retained turn, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(true)
    }
}
