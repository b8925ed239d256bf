pub mod checkout;
pub mod deliveries;
pub mod fulfillment;
pub mod orders;
pub mod products;
pub mod reconciliation;
pub mod registrations;
pub mod users;

use serde::{Deserialize, Serialize};

/// Identity of the calling user, passed explicitly to each data-access
/// call. Either field may be absent; lookups fall back across them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub email: Option<String>,
    pub uid: Option<String>,
}

impl SessionContext {
    pub fn new(email: Option<String>, uid: Option<String>) -> Self {
        Self { email, uid }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.uid.is_none()
    }
}
