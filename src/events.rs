use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the order and invoicing services. Delivery is
/// fire-and-forget; a failed send is logged by the emitter, never propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    InvoiceIssued {
        order_id: Uuid,
        invoice_number: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel pair.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Background consumer for the event stream. Downstream delivery (email,
/// analytics) is handled outside this service; here events are surfaced to the
/// log so the stream is observable in every environment.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderCreated(order_id) => {
                info!(%order_id, "event: order created");
            }
            Event::InvoiceIssued {
                order_id,
                invoice_number,
            } => {
                info!(%order_id, %invoice_number, "event: invoice issued");
            }
        }
    }
    warn!("event channel closed; processor exiting");
}
