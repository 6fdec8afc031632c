/// Append-only, index-addressable storage for packed instruction words.
///
/// Handlers build bytecode by appending one, two, or three words at a time;
/// container compilation additionally needs `reserve`/`set` (forward-patching
/// an end offset once a container's length is known) and `truncate`
/// (discarding speculative writes on backtracking). Capacity grows
/// geometrically, so indices handed out by `reserve` stay valid until a
/// `truncate` or `clear` removes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytecodeBuffer {
    words: Vec<i32>,
}

impl BytecodeBuffer {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the word at `index`.
    ///
    /// Panics if `index >= len()`; reading unwritten slots is a caller bug.
    #[inline]
    pub fn get(&self, index: usize) -> i32 {
        match self.words.get(index) {
            Some(&word) => word,
            None => panic!(
                "invalid index {index} requested from BytecodeBuffer with {} words",
                self.words.len()
            ),
        }
    }

    /// Reserves one slot without giving it a meaningful value yet, returning
    /// its index for a later `set`.
    #[inline]
    pub fn reserve(&mut self) -> usize {
        let index = self.words.len();
        self.words.push(0);
        index
    }

    /// Overwrites a previously written or reserved slot.
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: i32) {
        match self.words.get_mut(index) {
            Some(slot) => *slot = value,
            None => panic!(
                "invalid index {index} set on BytecodeBuffer with {} words",
                self.words.len()
            ),
        }
    }

    #[inline]
    pub fn add(&mut self, value: i32) {
        self.words.push(value);
    }

    #[inline]
    pub fn add2(&mut self, value0: i32, value1: i32) {
        self.words.reserve(2);
        self.words.push(value0);
        self.words.push(value1);
    }

    #[inline]
    pub fn add3(&mut self, value0: i32, value1: i32, value2: i32) {
        self.words.reserve(3);
        self.words.push(value0);
        self.words.push(value1);
        self.words.push(value2);
    }

    /// Bulk-copies `length` words starting at `start` from another buffer.
    /// Used when splicing an already-compiled sub-region.
    pub fn add_slice(&mut self, other: &BytecodeBuffer, start: usize, length: usize) {
        self.words.extend_from_slice(&other.words[start..start + length]);
    }

    pub fn add_words(&mut self, words: &[i32]) {
        self.words.extend_from_slice(words);
    }

    /// Drops everything, keeping the backing allocation.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Shrinks the buffer back to `len` words. Panics if `len` exceeds the
    /// current length; truncation may only ever discard.
    pub fn truncate(&mut self, len: usize) {
        assert!(
            len <= self.words.len(),
            "truncate length {len} exceeds {} words",
            self.words.len()
        );
        self.words.truncate(len);
    }

    /// Read-only view of the committed words.
    #[inline]
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    pub fn to_vec(&self) -> Vec<i32> {
        self.words.clone()
    }
}
