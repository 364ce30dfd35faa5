use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::orders::{CreateOrderRequest, OrderResponse};
use crate::{errors::ServiceError, ApiResponse, AppState, ListQuery, PaginatedResponse};

/// Shared by every `/orders/{id}` endpoint so a malformed id always yields
/// the same JSON error body rather than axum's plain-text rejection.
pub(crate) fn resolve_order_id(id: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(id)
        .map_err(|_| ServiceError::InvalidInput(format!("'{}' is not a valid order id", id)))
}

/// One line of an order as the API presents it, with the computed tax for
/// the line included.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: rust_decimal::Decimal,
    pub size: Option<String>,
    pub color_name: Option<String>,
    pub tax_rate_percent: Option<rust_decimal::Decimal>,
    pub is_customized: bool,
    pub base_unit_price: Option<rust_decimal::Decimal>,
    pub customization_unit_cost: Option<rust_decimal::Decimal>,
    pub base_tax_rate_percent: Option<rust_decimal::Decimal>,
    pub customization_tax_rate_percent: Option<rust_decimal::Decimal>,
}

fn map_order_item_model(model: &crate::entities::order_item::Model) -> OrderItemView {
    OrderItemView {
        id: model.id,
        product_id: model.product_id,
        sku: model.sku.clone(),
        name: model.name.clone(),
        quantity: model.quantity,
        unit_price: model.unit_price,
        size: model.size.clone(),
        color_name: model.color_name.clone(),
        tax_rate_percent: model.tax_rate,
        is_customized: model.is_customized(),
        base_unit_price: model.base_unit_price,
        customization_unit_cost: model.customization_unit_cost,
        base_tax_rate_percent: model.base_tax_rate,
        customization_tax_rate_percent: model.customization_tax_rate,
    }
}

/// List orders with pagination
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "Get a paginated list of orders, newest first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
    ),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<PaginatedResponse<OrderResponse>>),
        (status = 400, description = "Invalid request parameters", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<OrderResponse>>>, ServiceError> {
    let svc = state.services.order.clone();
    let result = svc.list_orders(query.page, query.limit).await?;
    let total_pages = result.total.div_ceil(query.limit.max(1));
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: result.orders,
        total: result.total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Create a new order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    description = "Create a new order with its line items; the captured total and shipping charge are persisted verbatim",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let created = state.services.order.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Get order by ID
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    description = "Get an order by its ID",
    params(
        ("id" = String, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid order ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order_id = resolve_order_id(&id)?;
    match state.services.order.get_order(order_id).await? {
        Some(order) => Ok(Json(ApiResponse::success(order))),
        None => Err(ServiceError::NotFound(format!(
            "Order with ID {} not found",
            order_id
        ))),
    }
}

/// Get order items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    summary = "Get order items",
    description = "Get all line items for a specific order",
    params(
        ("id" = String, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Order items retrieved successfully", body = ApiResponse<Vec<OrderItemView>>),
        (status = 400, description = "Invalid order ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<OrderItemView>>>, ServiceError> {
    let order_id = resolve_order_id(&id)?;
    let items = state.services.order.get_order_items(order_id).await?;
    let mapped: Vec<OrderItemView> = items.iter().map(map_order_item_model).collect();
    Ok(Json(ApiResponse::success(mapped)))
}

/// Get the financial breakdown of an order
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/breakdown",
    summary = "Get order breakdown",
    description = "Derive the itemized financial breakdown (subtotal, GST split, shipping, discounts) of an order. All amounts are rounded to two decimals for display.",
    params(
        ("id" = String, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Breakdown derived successfully", body = ApiResponse<crate::pricing::BreakdownDisplay>),
        (status = 400, description = "Invalid order ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order_breakdown(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<crate::pricing::BreakdownDisplay>>, ServiceError> {
    let order_id = resolve_order_id(&id)?;
    let breakdown = state.services.order.get_order_breakdown(order_id).await?;
    Ok(Json(ApiResponse::success(breakdown.display())))
}
