use crate::{
    config::PricingConfig,
    db::DbPool,
    entities::order::Entity as OrderEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{
        build_breakdown, compute_line_item_tax, round2, BreakdownDisplay, PricingPolicy,
    },
    services::orders::{adjustments_from_order, line_item_from_model},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// One billed line on an invoice, with its tax already apportioned.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceLine {
    pub name: String,
    pub size: Option<String>,
    pub color_name: Option<String>,
    pub quantity: i32,
    /// Per-unit price actually billed for the line
    pub unit_price: Decimal,
    pub line_subtotal: Decimal,
    pub line_tax: Decimal,
    pub line_total: Decimal,
}

/// A tax invoice rendered from a stored order.
///
/// Invoices are derived documents here: nothing is persisted, and the
/// invoice number is a pure function of the order number so re-rendering
/// always yields the same document.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub order_id: Uuid,
    pub order_number: String,
    pub issued_at: DateTime<Utc>,
    pub order_date: DateTime<Utc>,
    pub currency: String,
    pub seller_name: String,
    pub seller_gstin: Option<String>,
    pub seller_address: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub totals: BreakdownDisplay,
}

/// Service rendering invoices from persisted orders
#[derive(Clone)]
pub struct InvoicingService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    policy: PricingPolicy,
    seller_name: String,
    seller_gstin: Option<String>,
    seller_address: Option<String>,
}

impl InvoicingService {
    /// Creates a new invoicing service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        pricing: &PricingConfig,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            policy: pricing.policy(),
            seller_name: pricing.seller_name.clone(),
            seller_gstin: pricing.seller_gstin.clone(),
            seller_address: pricing.seller_address.clone(),
        }
    }

    /// Renders the invoice for an order
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn render_invoice(&self, order_id: Uuid) -> Result<InvoiceDocument, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .find_with_related(crate::entities::order_item::Entity)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch order for invoicing");
                ServiceError::DatabaseError(e)
            })?
            .into_iter()
            .next();

        let (order, item_models) = order
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items: Vec<_> = item_models.iter().map(line_item_from_model).collect();
        let adjustments = adjustments_from_order(&order);

        let breakdown = build_breakdown(
            &items,
            &adjustments,
            order.shipping_state.as_deref(),
            &self.policy,
        );

        if !breakdown.warnings.is_empty() {
            warn!(
                order_id = %order_id,
                warnings = breakdown.warnings.len(),
                "invoice rendered for an order with pricing warnings"
            );
        }

        let lines = items
            .iter()
            .map(|item| {
                let line_subtotal = item.line_subtotal();
                let line_tax =
                    compute_line_item_tax(item, self.policy.default_tax_rate_percent);
                InvoiceLine {
                    name: item.name.clone(),
                    size: item.size.clone(),
                    color_name: item.color_name.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_subtotal: round2(line_subtotal),
                    line_tax: round2(line_tax),
                    line_total: round2(line_subtotal + line_tax),
                }
            })
            .collect();

        let invoice_number = invoice_number_for(&order.order_number);

        info!(order_id = %order_id, invoice_number = %invoice_number, "Invoice rendered");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::InvoiceIssued {
                    order_id,
                    invoice_number: invoice_number.clone(),
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send invoice issued event");
            }
        }

        Ok(InvoiceDocument {
            invoice_number,
            order_id: order.id,
            order_number: order.order_number,
            issued_at: Utc::now(),
            order_date: order.order_date,
            currency: order.currency,
            seller_name: self.seller_name.clone(),
            seller_gstin: self.seller_gstin.clone(),
            seller_address: self.seller_address.clone(),
            billing_address: order.billing_address,
            shipping_address: order.shipping_address,
            lines,
            totals: breakdown.display(),
        })
    }
}

/// Deterministic invoice number for an order number.
fn invoice_number_for(order_number: &str) -> String {
    format!("INV-{}", order_number)
}
