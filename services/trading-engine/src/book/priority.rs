//! Heap entries with price-time priority
//!
//! `BinaryHeap` is a max-heap, so each side wraps its orders in a type
//! whose `Ord` puts the best order on top:
//! - bids: higher price first, then earlier arrival
//! - asks: lower price first, then earlier arrival
//!
//! The ordering key (price, timestamp) never changes once an order is in a
//! heap. Only the remaining quantity is mutable, through [`HeapPriority::fill`].

use std::cmp::Ordering;
use types::errors::MatchError;
use types::numeric::Quantity;
use types::order::{Order, Side};

/// An order wrapped with the priority of one book side
pub trait HeapPriority: Ord {
    /// Side whose orders this entry type holds
    const SIDE: Side;

    fn wrap(order: Order) -> Self;

    fn order(&self) -> &Order;

    fn into_order(self) -> Order;

    /// Decrement the wrapped order's remaining quantity
    fn fill(&mut self, executed: Quantity) -> Result<(), MatchError>;
}

/// Buy-side entry: max-priority on price, ties to earliest timestamp
#[derive(Debug, Clone)]
pub struct BidPriority(Order);

/// Sell-side entry: min-priority on price, ties to earliest timestamp
#[derive(Debug, Clone)]
pub struct AskPriority(Order);

impl Ord for BidPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .price
            .cmp(&other.0.price)
            .then_with(|| other.0.timestamp.cmp(&self.0.timestamp))
    }
}

impl Ord for AskPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .price
            .cmp(&self.0.price)
            .then_with(|| other.0.timestamp.cmp(&self.0.timestamp))
    }
}

macro_rules! impl_heap_priority {
    ($entry:ident, $side:expr) => {
        impl PartialOrd for $entry {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl PartialEq for $entry {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other) == Ordering::Equal
            }
        }

        impl Eq for $entry {}

        impl HeapPriority for $entry {
            const SIDE: Side = $side;

            fn wrap(order: Order) -> Self {
                Self(order)
            }

            fn order(&self) -> &Order {
                &self.0
            }

            fn into_order(self) -> Order {
                self.0
            }

            fn fill(&mut self, executed: Quantity) -> Result<(), MatchError> {
                self.0.fill(executed)
            }
        }
    };
}

impl_heap_priority!(BidPriority, Side::Buy);
impl_heap_priority!(AskPriority, Side::Sell);
