use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::inventory::StockIntakeOutcome;

/// Domain events emitted after a mutating operation commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemCreated {
        item_id: i32,
        mpn: String,
    },
    EquivalenceLinked {
        item_id: i32,
        equivalent_item_id: i32,
    },
    StockReceived {
        inventory_id: i32,
        item_id: i32,
        quantity: i32,
        outcome: StockIntakeOutcome,
        actor: Option<Uuid>,
    },
    StockIssued {
        inventory_id: i32,
        quantity: i32,
        claimant_id: i32,
        serialized: bool,
        actor: Option<Uuid>,
    },
    OrderCreated {
        order_id: i32,
        order_number: i32,
        order_year: i32,
    },
    OrderUpdated {
        order_id: i32,
    },
    OrderItemAdded {
        order_id: i32,
        order_item_id: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event; failure is reported but must not roll back the
    /// already-committed operation that produced it.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Background pump draining the event channel. Currently events only feed
/// the structured log; the channel keeps the seam open for outbound
/// notifications later.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(event = %payload, "domain event"),
            Err(e) => warn!(error = %e, ?event, "failed to serialize domain event"),
        }
    }
    info!("event channel closed, stopping event processor");
}
