//! Entity iteration with backpressure.
//!
//! Modules that walk long entity lists go through [`Pacing::each`], which
//! pauses between batches so a rate-limited data source is not flooded. The
//! policy is configured separately from any rule logic.

use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Entities per batch; 0 disables batching
    pub batch_size: usize,
    /// Pause between batches in milliseconds
    pub pause_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            batch_size: 200,
            pause_ms: 0,
        }
    }
}

impl Pacing {
    /// Visit every item in order, pausing after each full batch that is
    /// followed by more work.
    pub fn each<T>(&self, items: &[T], mut visit: impl FnMut(&T)) {
        for (i, item) in items.iter().enumerate() {
            visit(item);
            if self.pause_after(i + 1, items.len()) {
                thread::sleep(Duration::from_millis(self.pause_ms));
            }
        }
    }

    fn pause_after(&self, done: usize, total: usize) -> bool {
        self.batch_size > 0 && self.pause_ms > 0 && done < total && done % self.batch_size == 0
    }
}
