use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = r#"
# Storefront Order & GST Pricing API

Order storage and the pricing engine behind the storefront's order pages and
tax invoices.

## Features

- **Order Management**: Create, list, and track customer orders with their line items
- **Financial Breakdown**: Derive the itemized subtotal, GST split, shipping, and discounts for any order
- **GST Handling**: CGST/SGST for intra-state deliveries, IGST for inter-state, with per-component rates on personalized items
- **Invoices**: Deterministic tax invoices rendered on demand from stored orders

## Error Handling

The API uses consistent error response formats with appropriate HTTP status codes:

```json
{
  "error": "Bad Request",
  "message": "Validation failed",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints support pagination with the following query parameters:
- `page`: Page number (default: 1)
- `limit`: Items per page (default: 20)
        "#
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order management endpoints"),
        (name = "Breakdowns", description = "Financial breakdown endpoints"),
        (name = "Invoices", description = "Invoice rendering endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_items,
        crate::handlers::orders::get_order_breakdown,

        // Invoices
        crate::handlers::invoices::get_order_invoice,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Order types
            crate::services::orders::OrderResponse,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::CreateOrderItem,
            crate::services::orders::CustomizationInput,
            crate::handlers::orders::OrderItemView,

            // Pricing types
            crate::pricing::BreakdownDisplay,
            crate::pricing::PricingWarning,
            crate::pricing::TaxRegime,

            // Invoice types
            crate::services::invoicing::InvoiceDocument,
            crate::services::invoicing::InvoiceLine,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
