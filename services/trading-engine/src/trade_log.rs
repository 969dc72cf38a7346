//! Append-only log of matched trades
//!
//! Entries live in write-once slots grouped into segments of doubling size
//! (32, 64, 128, ...), so a segment never moves once allocated. Appends are
//! serialized by a mutex and publish the new length only after their
//! entries are written. Readers load the published length and read slots
//! below it without taking any lock, so an append never blocks a reader.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use types::trade::MatchedOrder;

/// log2 of the first segment's length
const FIRST_SEGMENT_SHIFT: u32 = 5;

/// Enough segments to address every `usize` index
const SEGMENTS: usize = (usize::BITS - FIRST_SEGMENT_SHIFT) as usize;

type Segment = Box<[OnceLock<MatchedOrder>]>;

/// (segment, offset) of a log position
fn locate(index: usize) -> (usize, usize) {
    let shifted = index + (1 << FIRST_SEGMENT_SHIFT);
    let bit = usize::BITS - 1 - shifted.leading_zeros();
    ((bit - FIRST_SEGMENT_SHIFT) as usize, shifted - (1 << bit))
}

fn segment_len(segment: usize) -> usize {
    1 << (segment as u32 + FIRST_SEGMENT_SHIFT)
}

pub struct TradeLog {
    segments: Box<[OnceLock<Segment>]>,
    /// Published length; every slot below it is written
    len: AtomicUsize,
    append: Mutex<()>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self {
            segments: (0..SEGMENTS).map(|_| OnceLock::new()).collect(),
            len: AtomicUsize::new(0),
            append: Mutex::new(()),
        }
    }

    /// Append trades in detection order, stamping each with its 1-based
    /// log sequence; returns how many were appended
    pub fn append(&self, trades: impl IntoIterator<Item = MatchedOrder>) -> usize {
        let _guard = self.append.lock();
        let start = self.len.load(Ordering::Relaxed);
        let mut len = start;

        for mut trade in trades {
            trade.sequence = len as u64 + 1;
            let (segment, offset) = locate(len);
            let slots = self.segments[segment]
                .get_or_init(|| (0..segment_len(segment)).map(|_| OnceLock::new()).collect());
            // Single writer under the append lock: the slot is always empty
            let _ = slots[offset].set(trade);
            len += 1;
        }

        self.len.store(len, Ordering::Release);
        len - start
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at a 0-based log position
    pub fn get(&self, index: usize) -> Option<&MatchedOrder> {
        if index >= self.len() {
            return None;
        }
        let (segment, offset) = locate(index);
        self.segments[segment].get()?.get(offset)?.get()
    }

    /// Copy of the whole log
    pub fn snapshot(&self) -> Vec<MatchedOrder> {
        self.since(0)
    }

    /// Copy of the entries from `offset` on
    pub fn since(&self, offset: usize) -> Vec<MatchedOrder> {
        let len = self.len();
        (offset..len)
            .filter_map(|index| self.get(index).cloned())
            .collect()
    }
}

impl Default for TradeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TradeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeLog").field("len", &self.len()).finish()
    }
}
