//! Trading engine core
//!
//! Routes orders to per-ticker books through the ticker index and runs the
//! matching loop that scans every registered book.
//!
//! Locking: `add_order` takes only the target book's lock (plus the index
//! registration lock the first time a ticker is seen). Scans are serialized
//! by a scan lock, so the loop thread and any caller of `run_scan` never
//! interleave their appends. Within a scan, each book's lock is held for
//! that book's match burst, and the trade log's append mutex is taken to
//! log what the burst produced. Log readers never lock. Submitters never
//! touch the scan lock.

use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use types::errors::{EngineError, IndexError};
use types::ids::TickerSymbol;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderHandle, Side};
use types::trade::MatchedOrder;

use crate::book::{BookSnapshot, Depth, OrderBook};
use crate::config::EngineConfig;
use crate::index::{SeededFxHasher, TickerHasher, TickerIndex};
use crate::matching::executor::unix_nanos;
use crate::stats::{EngineStats, StatsSnapshot};
use crate::trade_log::TradeLog;

/// Multi-ticker matching engine
///
/// Shareable across threads (`Arc<TradingEngine>`); every method takes
/// `&self`. Dropping a running engine stops its matching loop.
pub struct TradingEngine {
    shared: Arc<EngineShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// State reachable from both submitters and the loop thread
struct EngineShared {
    config: EngineConfig,
    index: TickerIndex,
    /// Book arena; slot `i` belongs to the ticker the index stores at `i`
    books: Box<[OnceLock<OrderBook>]>,
    trades: TradeLog,
    /// Held for a whole scan so at most one scan runs at a time
    scanning: Mutex<()>,
    running: AtomicBool,
    /// Arrival sequence for order timestamps
    arrivals: AtomicU64,
    stats: EngineStats,
}

impl TradingEngine {
    /// Create an engine with the default seeded ticker hasher
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let hasher = SeededFxHasher::new(config.hash_seed);
        Self::with_hasher(config, Box::new(hasher))
    }

    /// Create an engine with a custom ticker hash function
    pub fn with_hasher(
        config: EngineConfig,
        hasher: Box<dyn TickerHasher>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let index = TickerIndex::new(config.capacity, hasher)?;
        let books = (0..config.capacity).map(|_| OnceLock::new()).collect();

        info!(
            capacity = config.capacity,
            price_policy = ?config.price_policy,
            dynamic_registration = config.dynamic_registration,
            "TradingEngine initialized"
        );

        Ok(Self {
            shared: Arc::new(EngineShared {
                config,
                index,
                books,
                trades: TradeLog::new(),
                scanning: Mutex::new(()),
                running: AtomicBool::new(false),
                arrivals: AtomicU64::new(0),
                stats: EngineStats::default(),
            }),
            worker: Mutex::new(None),
        })
    }

    /// Create an engine with its tickers registered up front
    ///
    /// More distinct tickers than the configured capacity is a
    /// configuration error and no engine is built.
    pub fn with_tickers<I, S>(config: EngineConfig, tickers: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let engine = Self::new(config)?;
        for ticker in tickers {
            engine.register_ticker(ticker.as_ref()).map_err(|err| {
                error!(ticker = ticker.as_ref(), error = %err, "Ticker pre-registration failed");
                err
            })?;
        }
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Register a ticker and materialize its book; returns the book's slot
    ///
    /// Allowed even when dynamic registration is off.
    pub fn register_ticker(&self, symbol: &str) -> Result<usize, EngineError> {
        let ticker = TickerSymbol::try_new(symbol)?;
        let slot = self.shared.index.resolve(&ticker)?;
        self.shared.book_at(slot, &ticker);
        Ok(slot)
    }

    /// Slot of a registered ticker
    pub fn lookup_ticker(&self, symbol: &str) -> Result<usize, EngineError> {
        Ok(self.shared.index.lookup(symbol)?)
    }

    /// Validate an order and rest it in its ticker's book
    ///
    /// Rejected orders have no side effect on any book.
    pub fn add_order(
        &self,
        symbol: &str,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Result<OrderHandle, EngineError> {
        self.shared
            .admit(symbol, side, price, quantity)
            .map_err(|err| {
                self.shared.stats.record_rejected();
                warn!(ticker = symbol, %side, %price, %quantity, error = %err, "Order rejected");
                err
            })
    }

    /// Start the matching loop on its own thread
    pub fn start(&self) -> Result<(), EngineError> {
        let mut worker = self.worker.lock();
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Err(EngineError::AlreadyRunning);
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("match-loop".to_string())
            .spawn(move || shared.match_loop())
            .map_err(|e| {
                self.shared.running.store(false, Ordering::Release);
                error!(error = %e, "Failed to spawn match loop thread");
                EngineError::System {
                    message: format!("failed to spawn match loop: {e}"),
                }
            })?;

        *worker = Some(handle);
        Ok(())
    }

    /// Signal the matching loop and wait for its current scan to finish
    ///
    /// Resting orders and logged trades are left as they are. No-op if the
    /// loop is not running.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        self.shared.running.store(false, Ordering::Release);

        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                error!("Match loop thread panicked");
            }
            info!(trades = self.shared.trades.len(), "Trading engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// One full scan on the caller's thread; returns the number of matches
    ///
    /// Waits for any scan already in progress, including the loop's.
    pub fn run_scan(&self) -> usize {
        self.shared.scan()
    }

    /// Scan until a scan finds nothing to match; returns total matches
    pub fn match_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let matched = self.shared.scan();
            if matched == 0 {
                return total;
            }
            total += matched;
        }
    }

    /// Copy of the matched-trade log in detection order
    pub fn matched_trades(&self) -> Vec<MatchedOrder> {
        self.shared.trades.snapshot()
    }

    /// Log entries from `offset` on, for incremental readers
    pub fn trades_since(&self, offset: usize) -> Vec<MatchedOrder> {
        self.shared.trades.since(offset)
    }

    pub fn trade_count(&self) -> usize {
        self.shared.trades.len()
    }

    /// Best eligible order of one side of a ticker's book
    pub fn peek_best(&self, symbol: &str, side: Side) -> Option<Order> {
        self.book(symbol)?.peek_best(side)
    }

    pub fn book_snapshot(&self, symbol: &str) -> Option<BookSnapshot> {
        self.book(symbol).map(OrderBook::snapshot)
    }

    pub fn depth(&self, symbol: &str, levels: usize) -> Option<Depth> {
        self.book(symbol).map(|book| book.depth(levels))
    }

    /// Registered tickers in registration order
    pub fn registered_tickers(&self) -> Vec<TickerSymbol> {
        self.shared
            .index
            .iter()
            .map(|(_, ticker)| ticker.clone())
            .collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    fn book(&self, symbol: &str) -> Option<&OrderBook> {
        let slot = self.shared.index.lookup(symbol).ok()?;
        self.shared.books[slot].get()
    }
}

impl Drop for TradingEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl EngineShared {
    /// Book of a resolved slot, created on first use
    fn book_at(&self, slot: usize, ticker: &TickerSymbol) -> &OrderBook {
        self.books[slot].get_or_init(|| OrderBook::new(ticker.clone(), self.config.price_policy))
    }

    fn resolve(&self, ticker: &TickerSymbol) -> Result<usize, IndexError> {
        if self.config.dynamic_registration {
            self.index.resolve(ticker)
        } else {
            self.index.lookup(ticker.as_str())
        }
    }

    fn admit(
        &self,
        symbol: &str,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Result<OrderHandle, EngineError> {
        let ticker = TickerSymbol::try_new(symbol)?;
        Order::validate(price, quantity)?;

        let slot = self.resolve(&ticker)?;
        let book = self.book_at(slot, &ticker);

        let order = Order::new(ticker.clone(), side, price, quantity, 0, unix_nanos());
        let order_id = order.order_id;
        let timestamp = book.insert_stamped(order, &self.arrivals);
        self.stats.record_accepted();

        debug!(
            ticker = %ticker,
            %order_id,
            %side,
            %price,
            %quantity,
            slot,
            timestamp,
            "Order accepted"
        );

        Ok(OrderHandle {
            order_id,
            ticker_symbol: ticker,
            slot,
            timestamp,
        })
    }

    fn match_loop(&self) {
        let interval = self.config.scan_interval();
        info!(
            interval_ms = self.config.scan_interval_ms,
            "Match loop started"
        );

        while self.running.load(Ordering::Acquire) {
            self.scan();
            if interval.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(interval);
            }
        }

        info!(scans = self.stats.snapshot().scans, "Match loop stopped");
    }

    /// One pass over every registered book
    ///
    /// A failing book is logged and skipped; the scan always completes.
    fn scan(&self) -> usize {
        let _scanning = self.scanning.lock();
        let max_steps = self.config.max_matches_per_book;
        let mut batch = Vec::new();
        let mut matched = 0;

        for slot in self.index.slots() {
            let Some(book) = self.books[slot].get() else {
                // Registered but not materialized yet; next scan picks it up
                continue;
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                book.match_burst(max_steps, &mut batch)
            }));
            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(err)) => {
                    self.stats.record_anomaly();
                    warn!(ticker = %book.ticker(), slot, error = %err, "Book anomaly, skipping");
                }
                Err(_) => {
                    self.stats.record_anomaly();
                    error!(ticker = %book.ticker(), slot, "Match step panicked, skipping book");
                }
            }

            if !batch.is_empty() {
                for trade in &batch {
                    debug!(
                        ticker = %trade.ticker_symbol,
                        buy = %trade.buy_order_id,
                        sell = %trade.sell_order_id,
                        price = %trade.execution_price,
                        quantity = %trade.executed_quantity,
                        "Orders matched"
                    );
                }
                matched += self.trades.append(batch.drain(..));
            }
        }

        self.stats.record_scan(matched);
        matched
    }
}
