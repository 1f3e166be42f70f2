//! API request handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use shelf_core::{
    Book, BookCandidate, BookUpdate, Catalog, CatalogError, CatalogResult, Lookup, NewBook,
};

use super::ApiState;

/// Error response with a `{"detail": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    NotOnOpenLibrary,
    /// A blocking catalog task panicked or was cancelled
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Catalog(err @ CatalogError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Catalog(err @ CatalogError::Conflict { .. }) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Catalog(CatalogError::Storage(err)) => {
                error!(
                    error = %err,
                    recoverable = err.is_recoverable(),
                    suggestion = err.recovery_suggestion().unwrap_or(""),
                    "Failed to save library"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save library".to_string(),
                )
            }
            ApiError::NotOnOpenLibrary => (
                StatusCode::NOT_FOUND,
                "Book not found on OpenLibrary.".to_string(),
            ),
            ApiError::Internal(message) => {
                error!(error = %message, "Catalog task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Run a catalog mutation on the blocking pool.
///
/// Mutations rewrite the library file and fsync it, so they hold the write
/// lock off the async workers.
async fn mutate<T, F>(state: &ApiState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Catalog) -> CatalogResult<T> + Send + 'static,
{
    let mut catalog = state.catalog.clone().write_owned().await;
    tokio::task::spawn_blocking(move || op(&mut *catalog))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// Liveness check.
///
/// GET /healthz
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// List every book.
///
/// GET /books
pub async fn list_books(State(state): State<Arc<ApiState>>) -> Json<Vec<Book>> {
    let catalog = state.catalog.read().await;
    Json(catalog.list())
}

/// Get one book.
///
/// GET /books/:isbn
pub async fn get_book(
    State(state): State<Arc<ApiState>>,
    Path(isbn): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let catalog = state.catalog.read().await;
    Ok(Json(catalog.get(&isbn)?))
}

/// Add a book. The response carries the stored record with its `date_added`.
///
/// POST /books
pub async fn create_book(
    State(state): State<Arc<ApiState>>,
    Json(new): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = mutate(&state, move |catalog| catalog.create(new)).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book. `isbn` and `date_added` in the body are ignored.
///
/// PUT /books/:isbn
pub async fn update_book(
    State(state): State<Arc<ApiState>>,
    Path(isbn): Path<String>,
    Json(changes): Json<BookUpdate>,
) -> Result<Json<Book>, ApiError> {
    let book = mutate(&state, move |catalog| catalog.update(&isbn, &changes)).await?;
    Ok(Json(book))
}

/// Delete a book.
///
/// DELETE /books/:isbn
pub async fn delete_book(
    State(state): State<Arc<ApiState>>,
    Path(isbn): Path<String>,
) -> Result<StatusCode, ApiError> {
    mutate(&state, move |catalog| catalog.delete(&isbn)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch details from OpenLibrary without adding anything.
///
/// GET /openlibrary/:isbn
pub async fn lookup_book(
    State(state): State<Arc<ApiState>>,
    Path(isbn): Path<String>,
) -> Result<Json<BookCandidate>, ApiError> {
    match state.lookup.lookup(&isbn).await {
        Lookup::Found(candidate) => Ok(Json(candidate)),
        Lookup::NotFound => Err(ApiError::NotOnOpenLibrary),
    }
}
