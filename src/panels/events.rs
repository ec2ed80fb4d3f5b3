//! Store event definitions and broadcast event bus.
//!
//! Uses tokio::sync::broadcast so every open view receives every event.
//! Image results are tagged with the app they were requested for; receivers
//! drop the ones that no longer match their selection.

use crate::event_bus::CHANNEL_CAPACITY;
use crate::services::images::ImageLoaded;
use std::sync::OnceLock;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// All events published by background services.
#[derive(Clone, Debug)]
pub enum StoreEvent {
    Image(Box<ImageLoaded>), // Boxed to keep enum size small
    InstallFinished { app_id: String, success: bool },
}

// Static broadcast sender - subscribers get their own receiver via subscribe()
static STORE_SENDER: OnceLock<Sender<StoreEvent>> = OnceLock::new();

/// The process-wide sender.
pub fn sender() -> &'static Sender<StoreEvent> {
    STORE_SENDER.get_or_init(|| {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        tx
    })
}

/// Send an event to all views. Non-blocking.
/// If no receivers, the event is dropped (expected during startup).
#[inline]
pub fn send(event: StoreEvent) {
    let _ = sender().send(event);
}

/// Subscribe to the event bus.
/// Returns a new receiver that will receive all future events.
pub fn subscribe() -> Receiver<StoreEvent> {
    sender().subscribe()
}
