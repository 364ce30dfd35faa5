use crate::{
    db::DbPool,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
    entities::order_item::{
        self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity,
        Model as OrderItemModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{
        build_breakdown, CustomizationDetail, OrderAdjustments, OrderFinancialBreakdown,
        OrderLineItem, PricingPolicy, PricingWarning,
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request/Response types for the order service
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "Order number is required"))]
    pub order_number: String,
    /// Grand total captured from the customer, tax and shipping included
    pub total_amount: Decimal,
    #[validate(length(min = 3, max = 3, message = "Currency must be 3 characters"))]
    pub currency: String,
    #[serde(default)]
    pub coupon_discount: Decimal,
    #[serde(default)]
    pub wallet_amount_used: Decimal,
    /// Persisted verbatim; new orders always record shipping explicitly
    #[serde(default)]
    pub shipping_charge: Decimal,
    pub shipping_state: Option<String>,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderItem {
    pub product_id: Uuid,
    pub sku: String,
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    pub unit_price: Decimal,
    pub size: Option<String>,
    pub color_name: Option<String>,
    pub tax_rate_percent: Option<Decimal>,
    pub customization: Option<CustomizationInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomizationInput {
    pub base_unit_price: Decimal,
    pub customization_unit_cost: Decimal,
    pub base_tax_rate_percent: Decimal,
    pub customization_tax_rate_percent: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub currency: String,
    pub coupon_discount: Decimal,
    pub wallet_amount_used: Decimal,
    pub shipping_charge: Option<Decimal>,
    pub shipping_state: Option<String>,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Maps a stored line row into the pricing engine's input shape.
///
/// This is the only place entity columns meet engine fields; both the order
/// breakdown and the invoice go through it, so missing-value defaults are
/// applied exactly once. Missing component amounts become zero; missing
/// rates stay `None` so the engine applies its configured fallback.
pub fn line_item_from_model(model: &OrderItemModel) -> OrderLineItem {
    let customization = if model.is_customized() {
        Some(CustomizationDetail {
            base_unit_price: model.base_unit_price.unwrap_or(Decimal::ZERO),
            customization_unit_cost: model.customization_unit_cost.unwrap_or(Decimal::ZERO),
            base_tax_rate_percent: model.base_tax_rate.unwrap_or(Decimal::ZERO),
            customization_tax_rate_percent: model.customization_tax_rate,
        })
    } else {
        None
    };

    OrderLineItem {
        name: model.name.clone(),
        unit_price: model.unit_price,
        quantity: model.quantity,
        size: model.size.clone(),
        color_name: model.color_name.clone(),
        tax_rate_percent: model.tax_rate,
        customization,
    }
}

/// Order-level engine inputs lifted off the order header.
pub fn adjustments_from_order(order: &OrderModel) -> OrderAdjustments {
    OrderAdjustments {
        coupon_discount: order.coupon_discount,
        wallet_amount_used: order.wallet_amount_used,
        total_amount_charged: order.total_amount,
        recorded_shipping_charge: order.shipping_charge,
    }
}

/// Service for managing orders and deriving their financial breakdowns
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    policy: PricingPolicy,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        policy: PricingPolicy,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            policy,
        }
    }

    /// Creates a new order with its line items in one transaction
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, order_number = %request.order_number))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        for (field, value) in [
            ("total_amount", request.total_amount),
            ("coupon_discount", request.coupon_discount),
            ("wallet_amount_used", request.wallet_amount_used),
            ("shipping_charge", request.shipping_charge),
        ] {
            if value < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "{} must not be negative",
                    field
                )));
            }
        }
        for item in &request.items {
            item.validate()?;
            if item.unit_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Item '{}' has a negative unit price",
                    item.name
                )));
            }
            if let Some(customization) = &item.customization {
                if customization.base_unit_price < Decimal::ZERO
                    || customization.customization_unit_cost < Decimal::ZERO
                {
                    return Err(ServiceError::ValidationError(format!(
                        "Item '{}' has a negative customization amount",
                        item.name
                    )));
                }
            }
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let order_active_model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(request.order_number.clone()),
            customer_id: Set(request.customer_id),
            status: Set("pending".to_string()),
            order_date: Set(now),
            total_amount: Set(request.total_amount),
            currency: Set(request.currency),
            coupon_discount: Set(request.coupon_discount),
            wallet_amount_used: Set(request.wallet_amount_used),
            shipping_charge: Set(Some(request.shipping_charge)),
            shipping_state: Set(request.shipping_state),
            payment_status: Set(request.payment_status),
            payment_method: Set(request.payment_method),
            shipping_address: Set(request.shipping_address),
            billing_address: Set(request.billing_address),
            notes: Set(request.notes),
            is_archived: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        };

        let order_model = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create order in database");
            ServiceError::DatabaseError(e)
        })?;

        for item in request.items {
            let item_active_model = OrderItemActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                sku: Set(item.sku),
                name: Set(item.name),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                size: Set(item.size),
                color_name: Set(item.color_name),
                tax_rate: Set(item.tax_rate_percent),
                base_unit_price: Set(item.customization.as_ref().map(|c| c.base_unit_price)),
                customization_unit_cost: Set(item
                    .customization
                    .as_ref()
                    .map(|c| c.customization_unit_cost)),
                base_tax_rate: Set(item.customization.as_ref().map(|c| c.base_tax_rate_percent)),
                customization_tax_rate: Set(item
                    .customization
                    .as_ref()
                    .and_then(|c| c.customization_tax_rate_percent)),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            };

            item_active_model.insert(&txn).await.map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to create order item");
                ServiceError::DatabaseError(e)
            })?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, customer_id = %request.customer_id, "Order created successfully");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order created event");
            }
        }

        Ok(self.model_to_response(order_model))
    }

    /// Retrieves an order by ID
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id).one(db).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to fetch order from database");
            ServiceError::DatabaseError(e)
        })?;

        Ok(order.map(|model| self.model_to_response(model)))
    }

    /// Lists orders with pagination
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = OrderEntity::find()
            .filter(order::Column::IsArchived.eq(false))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;

        let orders = paginator.fetch_page(page.saturating_sub(1)).await.map_err(|e| {
            error!(error = %e, page = page, per_page = per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        let order_responses: Vec<OrderResponse> = orders
            .into_iter()
            .map(|order| self.model_to_response(order))
            .collect();

        info!(
            total = total,
            page = page,
            per_page = per_page,
            returned_count = order_responses.len(),
            "Orders listed"
        );

        Ok(OrderListResponse {
            orders: order_responses,
            total,
            page,
            per_page,
        })
    }

    /// Fetches the stored line rows of an order, failing with `NotFound` when
    /// the order itself does not exist
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order_items(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, ServiceError> {
        let db = &*self.db_pool;

        OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        self.fetch_item_rows(order_id).await
    }

    async fn fetch_item_rows(&self, order_id: Uuid) -> Result<Vec<OrderItemModel>, ServiceError> {
        let db = &*self.db_pool;

        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to fetch order items");
                ServiceError::DatabaseError(e)
            })?;

        Ok(items)
    }

    /// Derives the financial breakdown of a stored order.
    ///
    /// Recomputed on demand from the persisted rows; never stored. Any
    /// consistency warnings the engine recovers from are logged here with
    /// the order id so operators can find discrepant orders.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order_breakdown(
        &self,
        order_id: Uuid,
    ) -> Result<OrderFinancialBreakdown, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let item_models = self.fetch_item_rows(order_id).await?;
        let items: Vec<_> = item_models.iter().map(line_item_from_model).collect();
        let adjustments = adjustments_from_order(&order);

        let breakdown = build_breakdown(
            &items,
            &adjustments,
            order.shipping_state.as_deref(),
            &self.policy,
        );

        for warning in &breakdown.warnings {
            match warning {
                PricingWarning::NegativeRawShipping { raw } => {
                    warn!(
                        order_id = %order_id,
                        raw_shipping = %raw,
                        "captured charge is below reconstructed components; shipping floored to zero"
                    );
                }
            }
        }

        Ok(breakdown)
    }

    /// Converts an order model to response format
    fn model_to_response(&self, model: OrderModel) -> OrderResponse {
        OrderResponse {
            id: model.id,
            order_number: model.order_number,
            customer_id: model.customer_id,
            status: model.status,
            order_date: model.order_date,
            total_amount: model.total_amount,
            currency: model.currency,
            coupon_discount: model.coupon_discount,
            wallet_amount_used: model.wallet_amount_used,
            shipping_charge: model.shipping_charge,
            shipping_state: model.shipping_state,
            payment_status: model.payment_status,
            payment_method: model.payment_method,
            shipping_address: model.shipping_address,
            billing_address: model.billing_address,
            notes: model.notes,
            is_archived: model.is_archived,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        }
    }
}
