//! Caller-owned buffer for raw console input.

/// Default number of characters a single read may deliver.
pub const DEFAULT_CAPACITY: usize = 64;

/// Fixed-capacity character buffer filled by a backend's `read_input`.
///
/// The producer reports how much it wrote through the buffer's own length.
#[derive(Debug, Clone)]
pub struct CharInputBuffer {
    chars: Vec<char>,
    capacity: usize,
}

impl CharInputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            chars: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.chars.len() >= self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.chars.len()
    }

    /// Appends a character; returns false once the buffer is full.
    pub fn push(&mut self, ch: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.chars.push(ch);
        true
    }

    pub fn as_slice(&self) -> &[char] {
        &self.chars
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn into_chars(self) -> Vec<char> {
        self.chars
    }
}

impl Default for CharInputBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
