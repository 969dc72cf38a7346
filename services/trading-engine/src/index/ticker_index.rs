//! Fixed-capacity ticker table with linear probing
//!
//! Slots are write-once. A ticker's slot never moves and is never freed, so
//! once a lookup finds it no further synchronization is needed: lookups do
//! not lock. Registration takes a mutex scoped to the insert path only and
//! re-probes under it, which makes it single-writer.
//!
//! Invariant: for every registered ticker, the probe sequence from its home
//! slot reaches it before reaching an empty slot.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use tracing::debug;
use types::errors::{EngineError, IndexError};
use types::ids::TickerSymbol;

use super::hasher::TickerHasher;

enum Probe {
    Hit(usize),
    Vacant(usize),
    Full,
}

pub struct TickerIndex {
    slots: Box<[OnceLock<TickerSymbol>]>,
    /// Occupied slots in registration order
    registered: Box<[OnceLock<usize>]>,
    len: AtomicUsize,
    hasher: Box<dyn TickerHasher>,
    registration: Mutex<()>,
}

impl TickerIndex {
    pub fn new(capacity: usize, hasher: Box<dyn TickerHasher>) -> Result<Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::Config {
                message: "ticker index capacity must be at least 1".to_string(),
            });
        }

        Ok(Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
            registered: (0..capacity).map(|_| OnceLock::new()).collect(),
            len: AtomicUsize::new(0),
            hasher,
            registration: Mutex::new(()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of registered tickers
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Initial probe position of a ticker
    pub fn home_slot(&self, ticker: &str) -> usize {
        (self.hasher.hash_ticker(ticker) % self.capacity() as u64) as usize
    }

    fn probe(&self, ticker: &str) -> Probe {
        let capacity = self.capacity();
        let home = self.home_slot(ticker);
        for step in 0..capacity {
            let slot = (home + step) % capacity;
            match self.slots[slot].get() {
                Some(existing) if existing.as_str() == ticker => return Probe::Hit(slot),
                Some(_) => continue,
                None => return Probe::Vacant(slot),
            }
        }
        Probe::Full
    }

    /// Slot of an already registered ticker; never locks
    pub fn lookup(&self, ticker: &str) -> Result<usize, IndexError> {
        match self.probe(ticker) {
            Probe::Hit(slot) => Ok(slot),
            Probe::Vacant(_) | Probe::Full => Err(IndexError::UnknownTicker {
                symbol: ticker.to_string(),
            }),
        }
    }

    /// Slot of a ticker, registering it on first sight
    ///
    /// Idempotent: the same ticker always resolves to the same slot. Fails
    /// with `CapacityExceeded` once every slot holds another ticker.
    pub fn resolve(&self, ticker: &TickerSymbol) -> Result<usize, IndexError> {
        if let Probe::Hit(slot) = self.probe(ticker.as_str()) {
            return Ok(slot);
        }

        let _guard = self.registration.lock();
        match self.probe(ticker.as_str()) {
            Probe::Hit(slot) => Ok(slot),
            Probe::Vacant(slot) => {
                self.slots[slot].get_or_init(|| ticker.clone());
                let position = self.len.load(Ordering::Relaxed);
                self.registered[position].get_or_init(|| slot);
                self.len.store(position + 1, Ordering::Release);
                debug!(
                    ticker = %ticker,
                    slot,
                    home = self.home_slot(ticker.as_str()),
                    registered = position + 1,
                    "Ticker registered"
                );
                Ok(slot)
            }
            Probe::Full => Err(IndexError::CapacityExceeded {
                capacity: self.capacity(),
            }),
        }
    }

    /// Ticker stored at a slot, if any
    pub fn ticker_at(&self, slot: usize) -> Option<&TickerSymbol> {
        self.slots.get(slot).and_then(OnceLock::get)
    }

    /// Occupied slots in registration order
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.registered[..self.len()]
            .iter()
            .filter_map(|slot| slot.get().copied())
    }

    /// (slot, ticker) pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TickerSymbol)> + '_ {
        self.slots()
            .filter_map(|slot| self.ticker_at(slot).map(|ticker| (slot, ticker)))
    }
}

impl fmt::Debug for TickerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickerIndex")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
