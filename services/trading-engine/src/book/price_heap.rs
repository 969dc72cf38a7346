//! One side of a ticker's book as a binary heap
//!
//! The top of the heap is always the best eligible order of its side.
//! Entries whose remaining quantity reached zero are purged lazily, before
//! the top is reported or handed out for matching.

use std::collections::binary_heap::PeekMut;
use std::collections::BinaryHeap;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::priority::{AskPriority, BidPriority, HeapPriority};

/// Buy side, highest price on top
pub type BidHeap = PriceHeap<BidPriority>;

/// Sell side, lowest price on top
pub type AskHeap = PriceHeap<AskPriority>;

/// Aggregated quantity at a single price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub orders: usize,
}

#[derive(Debug, Clone)]
pub struct PriceHeap<P> {
    heap: BinaryHeap<P>,
}

impl<P: HeapPriority> PriceHeap<P> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Push an order; O(log n)
    pub fn push(&mut self, order: Order) {
        debug_assert_eq!(order.side, P::SIDE, "order pushed onto the wrong side");
        self.heap.push(P::wrap(order));
    }

    /// Drop filled entries sitting on top; returns how many were removed
    pub fn purge_filled(&mut self) -> usize {
        let mut purged = 0;
        while let Some(top) = self.heap.peek_mut() {
            if !top.order().is_filled() {
                break;
            }
            PeekMut::pop(top);
            purged += 1;
        }
        purged
    }

    /// Best eligible order
    pub fn peek(&mut self) -> Option<&Order> {
        self.purge_filled();
        self.heap.peek().map(|entry| entry.order())
    }

    /// Mutable access to the best eligible entry
    ///
    /// Only the remaining quantity may be changed through it.
    pub(crate) fn peek_mut(&mut self) -> Option<PeekMut<'_, P>> {
        self.purge_filled();
        self.heap.peek_mut()
    }

    /// Remove and return the best eligible order
    pub fn pop(&mut self) -> Option<Order> {
        self.purge_filled();
        self.heap.pop().map(|entry| entry.into_order())
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Sum of remaining quantity across all entries
    pub fn total_quantity(&self) -> Quantity {
        self.heap
            .iter()
            .map(|entry| entry.order().remaining_quantity)
            .sum()
    }

    /// Unfilled orders, best first
    pub fn sorted_orders(&self) -> Vec<Order> {
        let mut entries: Vec<&P> = self
            .heap
            .iter()
            .filter(|entry| !entry.order().is_filled())
            .collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|e| e.order().clone()).collect()
    }

    /// Aggregated price levels, best first, at most `levels` of them
    pub fn depth(&self, levels: usize) -> Vec<DepthLevel> {
        let mut depth: Vec<DepthLevel> = Vec::new();
        for order in self.sorted_orders() {
            match depth.last_mut() {
                Some(level) if level.price == order.price => {
                    level.quantity += order.remaining_quantity;
                    level.orders += 1;
                }
                _ => {
                    if depth.len() == levels {
                        break;
                    }
                    depth.push(DepthLevel {
                        price: order.price,
                        quantity: order.remaining_quantity,
                        orders: 1,
                    });
                }
            }
        }
        depth
    }
}

impl<P: HeapPriority> Default for PriceHeap<P> {
    fn default() -> Self {
        Self::new()
    }
}
