use axum::{
    extract::{Path, State},
    response::Json,
};

use super::orders::resolve_order_id;
use crate::services::invoicing::InvoiceDocument;
use crate::{errors::ServiceError, ApiResponse, AppState};

/// Get the tax invoice for an order
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/invoice",
    summary = "Get order invoice",
    description = "Render the tax invoice for an order. The document is derived on demand from the stored order and is stable across renders.",
    params(
        ("id" = String, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Invoice rendered successfully", body = ApiResponse<InvoiceDocument>),
        (status = 400, description = "Invalid order ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InvoiceDocument>>, ServiceError> {
    let order_id = resolve_order_id(&id)?;
    let invoice = state.services.invoicing.render_invoice(order_id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}
