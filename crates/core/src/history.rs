//! Bounded conversation history buffers.
//!
//! The chat keeps three FIFO buffers per session: past user inputs,
//! generated responses, and formatted context entries. Each is capped;
//! pushing to a full buffer evicts the oldest entry first.

use std::collections::VecDeque;

/// Default cap for user inputs and generated responses.
pub const DEFAULT_TURN_CAP: usize = 10;

/// Default cap for formatted context entries.
pub const DEFAULT_CONTEXT_CAP: usize = 3;

/// A FIFO buffer that holds at most `cap` entries.
#[derive(Debug, Clone)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    cap: usize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Append an entry, evicting the oldest if the buffer is full.
    pub fn push(&mut self, item: T) {
        if self.cap == 0 {
            return;
        }
        while self.items.len() >= self.cap {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Oldest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// The per-session history state: user inputs, responses, context entries.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    user_inputs: BoundedBuffer<String>,
    responses: BoundedBuffer<String>,
    context_entries: BoundedBuffer<String>,
}

impl ConversationHistory {
    pub fn new(turn_cap: usize, context_cap: usize) -> Self {
        Self {
            user_inputs: BoundedBuffer::new(turn_cap),
            responses: BoundedBuffer::new(turn_cap),
            context_entries: BoundedBuffer::new(context_cap),
        }
    }

    pub fn push_user_input(&mut self, input: impl Into<String>) {
        self.user_inputs.push(input.into());
    }

    pub fn push_response(&mut self, response: impl Into<String>) {
        self.responses.push(response.into());
    }

    pub fn push_context_entry(&mut self, entry: impl Into<String>) {
        self.context_entries.push(entry.into());
    }

    pub fn user_inputs(&self) -> impl Iterator<Item = &String> {
        self.user_inputs.iter()
    }

    /// The response paired with the i-th buffered user input, if any.
    ///
    /// Responses lag inputs by one while a turn is in flight, and a failed
    /// turn leaves a permanent gap, exactly as in the parallel-array
    /// bookkeeping this mirrors.
    pub fn response_for(&self, index: usize) -> Option<&String> {
        self.responses.get(index)
    }

    pub fn context_entries(&self) -> impl Iterator<Item = &String> {
        self.context_entries.iter()
    }

    pub fn turn_count(&self) -> usize {
        self.user_inputs.len()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_CAP, DEFAULT_CONTEXT_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_evicts_oldest_first() {
        let mut buf = BoundedBuffer::new(3);
        for i in 0..5 {
            buf.push(i);
        }
        assert_eq!(buf.len(), 3);
        let items: Vec<_> = buf.iter().copied().collect();
        assert_eq!(items, vec![2, 3, 4]);
    }

    #[test]
    fn buffer_never_exceeds_cap() {
        let mut buf = BoundedBuffer::new(10);
        for i in 0..100 {
            buf.push(i);
            assert!(buf.len() <= 10);
        }
        assert_eq!(*buf.get(0).unwrap(), 90);
    }

    #[test]
    fn zero_cap_buffer_stays_empty() {
        let mut buf = BoundedBuffer::new(0);
        buf.push("x");
        assert!(buf.is_empty());
    }

    #[test]
    fn history_caps_hold_regardless_of_turn_count() {
        let mut history = ConversationHistory::default();
        for i in 0..50 {
            history.push_user_input(format!("input {i}"));
            history.push_response(format!("response {i}"));
            history.push_context_entry(format!("context {i}"));
        }
        assert_eq!(history.turn_count(), DEFAULT_TURN_CAP);
        assert_eq!(history.context_entries().count(), DEFAULT_CONTEXT_CAP);
        // Oldest evicted first
        assert_eq!(history.user_inputs().next().unwrap(), "input 40");
        assert_eq!(history.context_entries().next().unwrap(), "context 47");
    }

    #[test]
    fn response_gap_after_failed_turn() {
        let mut history = ConversationHistory::default();
        history.push_user_input("first");
        history.push_response("answered");
        history.push_user_input("second"); // turn failed, no response pushed
        assert_eq!(history.response_for(0).unwrap(), "answered");
        assert!(history.response_for(1).is_none());
    }
}
