use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted on settlement transitions. Consumers observe; none of
/// them perform writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderPaid {
        order_id: Uuid,
        payment_id: String,
    },
    RegistrationPaid {
        registration_id: Uuid,
        payment_id: String,
    },
    TokensCredited {
        user_id: Uuid,
        quantity: i32,
        new_balance: i32,
    },
    DeliveryCreated {
        order_id: Uuid,
        delivery_id: Uuid,
    },
    PaymentUnmatched {
        payment_id: String,
        external_reference: Option<String>,
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

    /// Sends an event; a full or closed channel is logged, never fatal.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to enqueue event: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Runs for the lifetime of
/// the process.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderPaid {
                order_id,
                payment_id,
            } => {
                info!(%order_id, %payment_id, "order settled");
            }
            Event::RegistrationPaid {
                registration_id,
                payment_id,
            } => {
                info!(%registration_id, %payment_id, "registration settled");
            }
            Event::TokensCredited {
                user_id,
                quantity,
                new_balance,
            } => {
                info!(%user_id, quantity, new_balance, "tokens credited");
            }
            Event::DeliveryCreated {
                order_id,
                delivery_id,
            } => {
                info!(%order_id, %delivery_id, "digital delivery created");
            }
            Event::PaymentUnmatched {
                payment_id,
                external_reference,
            } => {
                warn!(%payment_id, ?external_reference, "payment matched no order or registration");
            }
        }
    }
}
