//! Ordered counter store with atomic increment-and-rank semantics.
//!
//! The store is the only shared mutable resource in the system. All
//! mutation goes through [`CounterStore::increment_and_rank`], which
//! applies the increment and reads the resulting rank as one atomic
//! unit: a concurrent increment to the same key can never interleave
//! between the write and its paired rank read.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{PathRankError, PathRankResult};

/// One entry of the leaderboard: a canonical key and its hit score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    pub key: String,
    pub score: u64,
}

/// Scores plus an ordered index over (descending score, ascending key).
///
/// `Reverse<u64>` in the index tuple makes the natural BTreeSet order
/// descending by score with a lexicographic tie-break on the key, which
/// keeps enumeration deterministic under equal scores.
#[derive(Debug, Default)]
struct StoreInner {
    scores: HashMap<String, u64>,
    index: BTreeSet<(Reverse<u64>, String)>,
}

/// Key→score mapping with atomic increment-and-rank and descending
/// full-range enumeration.
///
/// A single mutex serializes increments; rank reads happen inside the
/// same critical section as the write they are paired with. The lock
/// scope performs no I/O, so blocking is bounded by sibling in-memory
/// operations only.
#[derive(Debug)]
pub struct CounterStore {
    inner: Mutex<StoreInner>,
    op_timeout: Duration,
}

impl CounterStore {
    /// Create an empty store. `op_timeout` is the fixed deadline for
    /// acquiring the store lock; past it, operations fail with
    /// `StoreUnavailable` instead of blocking indefinitely.
    pub fn new(op_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            op_timeout,
        }
    }

    /// Acquire the store lock within the operation deadline.
    fn lock(&self) -> PathRankResult<MutexGuard<'_, StoreInner>> {
        let deadline = Instant::now() + self.op_timeout;
        loop {
            match self.inner.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(PathRankError::StoreUnavailable(
                        "store lock poisoned".to_string(),
                    ));
                }
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(PathRankError::StoreUnavailable(format!(
                            "store lock not acquired within {:?}",
                            self.op_timeout
                        )));
                    }
                    std::thread::yield_now();
                }
            }
        }
    }

    /// Atomically add `delta` to `key` (creating it at score 0 first if
    /// absent) and return the resulting score together with the entry's
    /// zero-based rank in descending-score order.
    ///
    /// The returned rank reflects exactly this increment: under
    /// concurrent callers each one observes the rank corresponding to
    /// its own resulting score, never a stale or post-hoc value.
    pub fn increment_and_rank(&self, key: &str, delta: i64) -> PathRankResult<(u64, usize)> {
        if key.is_empty() {
            return Err(PathRankError::InvalidKey(
                "key must be non-empty".to_string(),
            ));
        }
        if delta < 0 {
            return Err(PathRankError::InvalidDelta(delta));
        }

        let mut inner = self.lock()?;

        let old_score = inner.scores.get(key).copied();
        if let Some(old) = old_score {
            inner.index.remove(&(Reverse(old), key.to_string()));
        }
        let new_score = old_score.unwrap_or(0) + delta as u64;
        inner.scores.insert(key.to_string(), new_score);
        inner.index.insert((Reverse(new_score), key.to_string()));

        let probe = (Reverse(new_score), key.to_string());
        let rank = inner.index.range(..&probe).count();

        trace!(key, score = new_score, rank, "increment_and_rank");
        Ok((new_score, rank))
    }

    /// Entries for rank positions `[start_rank, end_rank]` inclusive in
    /// descending-score order, ties broken by key ascending.
    ///
    /// `end_rank = -1` denotes "to the end". The result is one
    /// consistent snapshot: the lock is held for the whole read, so a
    /// concurrent increment can neither duplicate nor skip an entry.
    pub fn descending_range(
        &self,
        start_rank: usize,
        end_rank: i64,
    ) -> PathRankResult<Vec<CounterEntry>> {
        let inner = self.lock()?;

        let len = inner.index.len();
        if len == 0 {
            return Ok(Vec::new());
        }
        let end = if end_rank < 0 {
            len - 1
        } else {
            (end_rank as usize).min(len - 1)
        };
        if start_rank > end {
            return Ok(Vec::new());
        }

        let entries: Vec<CounterEntry> = inner
            .index
            .iter()
            .skip(start_rank)
            .take(end - start_rank + 1)
            .map(|(Reverse(score), key)| CounterEntry {
                key: key.clone(),
                score: *score,
            })
            .collect();

        debug!(
            start_rank,
            end_rank,
            returned = entries.len(),
            "descending_range"
        );
        Ok(entries)
    }

    /// Number of distinct keys currently tracked.
    pub fn len(&self) -> PathRankResult<usize> {
        Ok(self.lock()?.scores.len())
    }

    pub fn is_empty(&self) -> PathRankResult<bool> {
        Ok(self.lock()?.scores.is_empty())
    }
}
