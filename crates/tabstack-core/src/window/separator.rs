use super::types::WindowId;

/// First separator id. Window server ids are 32-bit, so everything at or above
/// this value can never collide with a real window.
pub const SEPARATOR_ID_BASE: u64 = 1 << 32;

/// Monotonic allocator for separator ids.
#[derive(Debug, Clone)]
pub struct SeparatorIds {
    next: u64,
}

impl SeparatorIds {
    pub fn new() -> Self {
        Self {
            next: SEPARATOR_ID_BASE,
        }
    }

    /// Allocate the next id. Wraps back to the base only when the u64 range
    /// is exhausted.
    pub fn allocate(&mut self) -> WindowId {
        let id = self.next;
        self.next = match self.next.checked_add(1) {
            Some(next) => next,
            None => SEPARATOR_ID_BASE,
        };
        WindowId(id)
    }
}

impl Default for SeparatorIds {
    fn default() -> Self {
        Self::new()
    }
}
