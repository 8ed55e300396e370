//! Fixed-capacity FIFO of customers waiting for a station.

use std::collections::VecDeque;

use crate::util::ids::CustomerId;

/// Bounded FIFO of pending customers.
///
/// Unlike a priority queue, order is strictly arrival order: the earliest
/// queued customer is always the next one handed a freed station.
#[derive(Debug, Clone)]
pub struct WaitingRoom {
    capacity: usize,
    seats: VecDeque<CustomerId>,
}

impl WaitingRoom {
    /// Create an empty waiting room with `capacity` seats.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seats: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Take a seat at the back. Returns the customer back if every seat is taken.
    pub fn push(&mut self, customer: CustomerId) -> Result<(), CustomerId> {
        if self.is_full() {
            return Err(customer);
        }
        self.seats.push_back(customer);
        Ok(())
    }

    /// Remove and return the earliest queued customer.
    pub fn pop(&mut self) -> Option<CustomerId> {
        self.seats.pop_front()
    }

    /// Earliest queued customer, without removing it.
    #[must_use]
    pub fn front(&self) -> Option<CustomerId> {
        self.seats.front().copied()
    }

    /// Whether `customer` currently holds a seat.
    #[must_use]
    pub fn contains(&self, customer: CustomerId) -> bool {
        self.seats.contains(&customer)
    }

    /// Remove every queued customer, earliest first.
    pub fn drain(&mut self) -> Vec<CustomerId> {
        self.seats.drain(..).collect()
    }

    /// Number of seats.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupied seats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Whether no one is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Whether every seat is taken. A zero-capacity room is always full.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.seats.len() >= self.capacity
    }

    /// Seats still free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.seats.len())
    }

    /// Queued customers in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = CustomerId> + '_ {
        self.seats.iter().copied()
    }
}
