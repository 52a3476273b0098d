use core::{cmp::min, fmt};
use primitives::{hex, U256};

/// One flat byte buffer serving the whole call tree.
///
/// Each frame sees only its own region: entering a call records the current
/// end as that frame's base offset, and every access is relative to the last
/// recorded base.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SharedMemory {
    /// The underlying buffer.
    data: Vec<u8>,
    /// Memory checkpoints for each depth.
    ///
    /// Invariant: these are always in bounds of `data`.
    checkpoints: Vec<usize>,
    /// How much memory has been used in the current context.
    current_len: usize,
    /// Memory limit. See [`CfgEnv`](primitives::CfgEnv).
    memory_limit: u64,
}

/// Empty shared memory.
///
/// Used as a placeholder inside Interpreter when it is not running.
pub const EMPTY_SHARED_MEMORY: SharedMemory = SharedMemory {
    data: Vec::new(),
    checkpoints: Vec::new(),
    current_len: 0,
    memory_limit: u64::MAX,
};

impl fmt::Debug for SharedMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMemory")
            .field("current_len", &self.current_len)
            .field("context_memory", &hex::encode(self.context_memory()))
            .finish_non_exhaustive()
    }
}

impl Default for SharedMemory {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SharedMemory {
    /// Creates a new memory instance that can be shared between calls.
    ///
    /// Starts with a 4KiB reservation, which covers most frames without
    /// reallocating.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(4 * 1024)
    }

    /// Creates a new memory instance with the given `capacity`.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            checkpoints: Vec::with_capacity(32),
            current_len: 0,
            memory_limit: u64::MAX,
        }
    }

    /// Creates a new memory instance with a `memory_limit` as an upper bound
    /// for the total allocation.
    #[inline]
    pub fn new_with_memory_limit(memory_limit: u64) -> Self {
        Self {
            memory_limit,
            ..Self::new()
        }
    }

    /// Returns `true` if the `new_size` for the current context memory would
    /// make the shared buffer length exceed the `memory_limit`.
    #[inline]
    pub fn limit_reached(&self, new_size: usize) -> bool {
        (self.last_checkpoint() + new_size) as u64 > self.memory_limit
    }

    /// Enters a child frame: the current end of memory becomes its base.
    #[inline]
    pub fn new_context(&mut self) {
        let new_checkpoint = self.last_checkpoint() + self.current_len;
        self.checkpoints.push(new_checkpoint);
        self.current_len = 0;
    }

    /// Leaves the current frame, surfacing the parent's region again.
    #[inline]
    pub fn free_context(&mut self) {
        if let Some(old_checkpoint) = self.checkpoints.pop() {
            let last_checkpoint = self.last_checkpoint();
            self.current_len = old_checkpoint - last_checkpoint;
            // Free the memory of the child context.
            self.data.truncate(old_checkpoint);
        }
    }

    /// Returns the length of the current memory range.
    #[inline]
    pub fn len(&self) -> usize {
        self.current_len
    }

    /// Returns `true` if the current memory range is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current_len == 0
    }

    /// Resizes the memory in-place so that `len` is equal to `new_size`.
    ///
    /// Assumes that gas for the expansion has already been charged and that
    /// `new_size` is a multiple of 32 greater than the current length.
    #[inline]
    pub fn resize(&mut self, new_size: usize) {
        self.data.resize(self.last_checkpoint() + new_size, 0);
        self.current_len = new_size;
    }

    /// Returns a byte slice of the memory region at the given offset.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds; callers must resize first.
    #[inline]
    pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
        let last_checkpoint = self.last_checkpoint();
        &self.data[last_checkpoint + offset..last_checkpoint + offset + size]
    }

    /// Returns a mutable byte slice of the memory region at the given offset.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds; callers must resize first.
    #[inline]
    pub fn slice_mut(&mut self, offset: usize, size: usize) -> &mut [u8] {
        let last_checkpoint = self.last_checkpoint();
        &mut self.data[last_checkpoint + offset..last_checkpoint + offset + size]
    }

    /// Returns the byte at the given offset.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn get_byte(&self, offset: usize) -> u8 {
        self.slice(offset, 1)[0]
    }

    /// Returns a 32-byte slice of the memory region at the given offset.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn get_word(&self, offset: usize) -> [u8; 32] {
        self.slice(offset, 32).try_into().unwrap()
    }

    /// Returns a big-endian [`U256`] read from the memory region at the given
    /// offset.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn get_u256(&self, offset: usize) -> U256 {
        U256::from_be_bytes(self.get_word(offset))
    }

    /// Sets the `byte` at the given `offset`.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn set_byte(&mut self, offset: usize, byte: u8) {
        self.set(offset, &[byte]);
    }

    /// Sets the given 32-byte `value` to the memory region at the given
    /// `offset`.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn set_word(&mut self, offset: usize, value: &[u8; 32]) {
        self.set(offset, value);
    }

    /// Sets the given big-endian `value` to the memory region at the given
    /// `offset`.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn set_u256(&mut self, offset: usize, value: U256) {
        self.set(offset, &value.to_be_bytes::<32>());
    }

    /// Sets the memory region at the given `offset` to `value`.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn set(&mut self, offset: usize, value: &[u8]) {
        if !value.is_empty() {
            self.slice_mut(offset, value.len()).copy_from_slice(value);
        }
    }

    /// Sets memory from `data`, copying `len` bytes starting at `data_offset`
    /// and zero-filling the part of the region that `data` does not cover.
    ///
    /// # Panics
    ///
    /// Panics if `memory_offset + len` is out of bounds; `data_offset` and
    /// `len` are bound-checked against `data`.
    #[inline]
    pub fn set_data(&mut self, memory_offset: usize, data_offset: usize, len: usize, data: &[u8]) {
        if data_offset >= data.len() {
            // nullify all memory slots
            self.slice_mut(memory_offset, len).fill(0);
            return;
        }
        let data_end = min(data_offset + len, data.len());
        let data_len = data_end - data_offset;
        self.slice_mut(memory_offset, data_len)
            .copy_from_slice(&data[data_offset..data_end]);

        // nullify the rest of the memory slots
        self.slice_mut(memory_offset + data_len, len - data_len).fill(0);
    }

    /// Copies elements from one part of the memory to another part of itself,
    /// supporting overlap.
    ///
    /// # Panics
    ///
    /// Panics on out of bounds.
    #[inline]
    pub fn copy(&mut self, dst: usize, src: usize, len: usize) {
        self.context_memory_mut().copy_within(src..src + len, dst);
    }

    /// Returns a reference to the memory of the current context, from the
    /// context's checkpoint to the end.
    #[inline]
    pub fn context_memory(&self) -> &[u8] {
        let last_checkpoint = self.last_checkpoint();
        &self.data[last_checkpoint..last_checkpoint + self.current_len]
    }

    /// Returns a mutable reference to the memory of the current context.
    #[inline]
    fn context_memory_mut(&mut self) -> &mut [u8] {
        let last_checkpoint = self.last_checkpoint();
        let current_len = self.current_len;
        &mut self.data[last_checkpoint..last_checkpoint + current_len]
    }

    /// Returns the last memory checkpoint.
    #[inline]
    fn last_checkpoint(&self) -> usize {
        self.checkpoints.last().copied().unwrap_or_default()
    }
}

/// Returns the number of 32-byte words required to store `len` bytes.
#[inline]
pub const fn num_words(len: u64) -> u64 {
    len.div_ceil(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_words() {
        assert_eq!(num_words(0), 0);
        assert_eq!(num_words(1), 1);
        assert_eq!(num_words(31), 1);
        assert_eq!(num_words(32), 1);
        assert_eq!(num_words(33), 2);
        assert_eq!(num_words(63), 2);
        assert_eq!(num_words(64), 2);
        assert_eq!(num_words(65), 3);
    }

    #[test]
    fn new_free_context() {
        let mut memory = SharedMemory::new();
        memory.new_context();

        assert_eq!(memory.checkpoints.len(), 1);
        assert_eq!(memory.last_checkpoint(), 0);

        memory.resize(32);
        memory.set_byte(0, 42);
        assert_eq!(memory.len(), 32);

        memory.new_context();
        assert_eq!(memory.checkpoints.len(), 2);
        assert_eq!(memory.last_checkpoint(), 32);
        assert_eq!(memory.len(), 0);

        memory.resize(96);
        memory.set_byte(10, 7);
        assert_eq!(memory.len(), 96);

        // childs memory is discarded, parents is restored byte for byte
        memory.free_context();
        assert_eq!(memory.checkpoints.len(), 1);
        assert_eq!(memory.last_checkpoint(), 0);
        assert_eq!(memory.len(), 32);
        assert_eq!(memory.get_byte(0), 42);

        memory.free_context();
        assert_eq!(memory.checkpoints.len(), 0);
        assert_eq!(memory.last_checkpoint(), 0);
        assert_eq!(memory.len(), 0);
    }

    #[test]
    fn set_data_zero_pads() {
        let mut memory = SharedMemory::new();
        memory.new_context();
        memory.resize(64);

        memory.set_data(0, 0, 8, &[1, 2, 3, 4]);
        assert_eq!(memory.slice(0, 8), &[1, 2, 3, 4, 0, 0, 0, 0]);

        // data offset beyond the source zero-fills everything
        memory.set(0, &[0xff; 8]);
        memory.set_data(0, 10, 8, &[1, 2, 3, 4]);
        assert_eq!(memory.slice(0, 8), &[0; 8]);
    }

    #[test]
    fn copy_supports_overlap() {
        let mut memory = SharedMemory::new();
        memory.new_context();
        memory.resize(64);
        memory.set(0, &[1, 2, 3, 4, 5, 6, 7, 8]);
        memory.copy(2, 0, 6);
        assert_eq!(memory.slice(0, 8), &[1, 2, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn limit_reached_accounts_for_checkpoint() {
        let mut memory = SharedMemory::new_with_memory_limit(64);
        memory.new_context();
        assert!(!memory.limit_reached(64));
        assert!(memory.limit_reached(65));

        memory.resize(32);
        memory.new_context();
        assert!(!memory.limit_reached(32));
        assert!(memory.limit_reached(33));
    }
}
