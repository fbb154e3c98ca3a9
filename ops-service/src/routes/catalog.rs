use axum::Json;
use envelope::{operation_catalog, OperationDescriptor};

pub async fn operations() -> Json<Vec<OperationDescriptor>> {
    Json(operation_catalog())
}
