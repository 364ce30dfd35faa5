pub mod invoices;
pub mod orders;

use crate::config::PricingConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub order: Arc<crate::services::orders::OrderService>,
    pub invoicing: Arc<crate::services::invoicing::InvoicingService>,
}

impl AppServices {
    /// Build the service container shared by all handlers.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        pricing: &PricingConfig,
    ) -> Self {
        let order = Arc::new(crate::services::orders::OrderService::new(
            db_pool.clone(),
            event_sender.clone(),
            pricing.policy(),
        ));
        let invoicing = Arc::new(crate::services::invoicing::InvoicingService::new(
            db_pool,
            event_sender,
            pricing,
        ));

        Self { order, invoicing }
    }
}
