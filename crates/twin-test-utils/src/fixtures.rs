//! Cache object fixtures.
//!
//! [`Page`] is keyed by `u64`, carries a payload derived from its key so
//! tests can detect corruption, and records its id in a thread-local drop
//! log when destroyed.

use std::cell::RefCell;
use std::fmt;

use twin_core::{FromKey, KeyProvider};

/// Payload bytes carried by every [`Page`].
pub const PAGE_PAYLOAD: usize = 48;

thread_local! {
    static DROP_LOG: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Ids of every [`Page`] dropped on this thread since the last reset, in
/// drop order.
pub fn drop_log() -> Vec<u64> {
    DROP_LOG.with(|log| log.borrow().clone())
}

/// Clear this thread's drop log.
pub fn reset_drop_log() {
    DROP_LOG.with(|log| log.borrow_mut().clear());
}

/// A cacheable object built from a `u64` key.
#[derive(Debug)]
pub struct Page {
    pub id: u64,
    pub payload: [u8; PAGE_PAYLOAD],
    pub reads: u32,
}

impl Page {
    pub fn new(id: u64) -> Self {
        let mut payload = [0u8; PAGE_PAYLOAD];
        for (i, byte) in payload.iter_mut().enumerate() {
            *byte = id.wrapping_mul(31).wrapping_add(i as u64) as u8;
        }
        Self {
            id,
            payload,
            reads: 0,
        }
    }

    /// Whether the payload still matches what [`Page::new`] wrote.
    pub fn is_intact(&self) -> bool {
        self.payload == Page::new(self.id).payload
    }
}

impl KeyProvider<u64> for Page {
    fn matches_key(&self, key: &u64) -> bool {
        self.id == *key
    }
}

impl FromKey<u64> for Page {
    fn from_key(key: &u64) -> Self {
        Page::new(*key)
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        let id = self.id;
        // Skip logging if the thread-local is already gone.
        let _ = DROP_LOG.try_with(|log| log.borrow_mut().push(id));
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_log_their_drop() {
        reset_drop_log();
        drop(Page::new(3));
        drop(Page::from_key(&9));
        assert_eq!(drop_log(), vec![3, 9]);
        reset_drop_log();
        assert!(drop_log().is_empty());
    }

    #[test]
    fn payload_is_derived_from_key() {
        let page = Page::new(42);
        assert!(page.is_intact());
        assert!(page.matches_key(&42));
        assert!(!page.matches_key(&41));
        assert_eq!(page.to_string(), "Page(42)");
    }
}
