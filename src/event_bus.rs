//! Event bus for cross-thread communication.
//!
//! Background workers (image loads, catalog refresh) publish on a tokio
//! broadcast channel; the front-end polls and drains it on a timer.
//!
//! This module provides shared utilities. Event types live in
//! `panels::events`.

use tokio::sync::broadcast::{self, Receiver};

/// Broadcast channel capacity.
/// A detail view issues at most six image loads per selection.
pub const CHANNEL_CAPACITY: usize = 64;

/// Poll interval for front-end event loops.
pub const EVENT_POLL_INTERVAL_MS: u64 = 50;

/// Drain everything currently queued on a receiver.
/// Handles RecvError::Lagged by continuing to drain.
pub fn drain<T: Clone>(rx: &mut Receiver<T>) -> Vec<T> {
    let mut events = Vec::new();

    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Empty) => break,
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue, // Skip old, keep draining
            Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }

    events
}
