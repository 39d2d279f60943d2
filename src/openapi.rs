use utoipa::OpenApi;

/// OpenAPI documentation for the mutating endpoints; read endpoints are
/// self-describing through their routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AeroStock API",
        description = "Aircraft-parts inventory, stock movements and maintenance orders",
    ),
    paths(
        crate::handlers::items::create_item,
        crate::handlers::inventory::receive_stock,
        crate::handlers::inventory::issue_stock,
        crate::handlers::orders::create_order,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::items::CreateItemRequest,
        crate::handlers::inventory::ReceiveStockBody,
        crate::handlers::inventory::IssueStockBody,
        crate::handlers::orders::CreateOrderRequest,
        crate::services::inventory::StockIntakeOutcome,
    )),
    tags(
        (name = "catalog", description = "Items and equivalences"),
        (name = "inventory", description = "Stock ledger and movements"),
        (name = "orders", description = "Maintenance orders"),
    )
)]
pub struct ApiDoc;

pub fn api_doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
