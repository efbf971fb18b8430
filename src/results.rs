// Holds the single most recent processed result. Concurrent generations
// are legal; each one takes a monotonically increasing id and only the
// newest id may commit, so a slow stale call never clobbers a fresher
// result (last-write-wins resolved by start order).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct ResultStore {
    next_id: AtomicU64,
    committed: RwLock<Committed>,
}

#[derive(Debug, Default)]
struct Committed {
    id: u64,
    text: Option<String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the id for a new in-flight generation.
    pub fn begin(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commits a finished generation. Returns false when a newer
    /// generation already committed, in which case the store is untouched.
    pub fn commit(&self, id: u64, text: String) -> bool {
        let mut committed = self.committed.write().unwrap();
        if id < committed.id {
            return false;
        }
        committed.id = id;
        committed.text = Some(text);
        true
    }

    pub fn current(&self) -> Option<String> {
        self.committed.read().unwrap().text.clone()
    }
}
