//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, history, requests};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stacks API",
        version = "0.3.0",
        description = "Library borrowing and circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        // Requests
        requests::submit_request,
        requests::list_requests,
        requests::decide_request,
        requests::record_return,
        // History
        history::my_history,
        history::user_history,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::BorrowRequestDetails,
            crate::models::request::RequestStatus,
            crate::models::interval::DateRange,
            requests::SubmitRequestPayload,
            requests::DecisionPayload,
            requests::ReturnPayload,
            // History
            crate::models::history::HistoryEntry,
            crate::models::history::HistoryEntryDetails,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog listing"),
        (name = "requests", description = "Borrow request lifecycle"),
        (name = "history", description = "Borrow history ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
