//! HTTP adapter
//!
//! Routes requests onto [`CatalogService`] and maps [`ErrorKind`]s to status
//! codes. Storage calls are blocking, so every handler hops onto the blocking
//! pool before touching the disk.
//!
//! | Route                     | Behaviour                                   |
//! |---------------------------|---------------------------------------------|
//! | `GET /`                   | `{"message": "Hello, world!"}`              |
//! | `POST /items`             | multipart `name`, `category`, `image`       |
//! | `GET /items`              | `{"items": [...]}`                          |
//! | `GET /items/:id`          | one item                                    |
//! | `GET /images/:filename`   | image bytes, placeholder when missing       |

use crate::error::{CatalogError, ErrorKind};
use crate::item::Item;
use crate::service::CatalogService;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

pub type SharedCatalog = Arc<CatalogService>;

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    /// Failure from the catalog core
    Catalog(CatalogError),
    /// Malformed request the core never saw
    BadRequest(String),
    /// Failure in the adapter itself
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::Catalog(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Catalog(e) => {
                let status = StatusCode::from_u16(e.kind().http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if e.kind() == ErrorKind::StorageIo {
                    error!(error = %e, "Storage failure");
                }
                (status, e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct AddItemResponse {
    message: String,
    item: Item,
}

#[derive(Debug, Serialize)]
struct ItemsResponse {
    items: Vec<Item>,
}

/// Build the router with CORS restricted to `front_url`
pub fn router(catalog: SharedCatalog, front_url: &str) -> Result<Router, ApiError> {
    let origin = front_url
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("invalid front url {}: {}", front_url, e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/", get(hello))
        .route("/items", get(get_items).post(add_item))
        .route("/items/:id", get(get_item))
        .route("/images/:filename", get(get_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(catalog))
}

async fn blocking<T, F>(catalog: &SharedCatalog, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&CatalogService) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let catalog = catalog.clone();
    tokio::task::spawn_blocking(move || f(&catalog))
        .await
        .map_err(|e| ApiError::Internal(format!("storage task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, world!".to_string(),
    })
}

async fn add_item(
    State(catalog): State<SharedCatalog>,
    mut multipart: Multipart,
) -> Result<Json<AddItemResponse>, ApiError> {
    let mut name = String::new();
    let mut category = String::new();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                name = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?
            }
            "category" => {
                category = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?
            }
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read image file: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("image is required".to_string()))?;

    let item = blocking(&catalog, move |c| c.add_item(&name, &category, &image)).await?;
    Ok(Json(AddItemResponse {
        message: format!("item received: {}", item.name),
        item,
    }))
}

async fn get_items(State(catalog): State<SharedCatalog>) -> Result<Json<ItemsResponse>, ApiError> {
    let items = blocking(&catalog, |c| c.get_items()).await?;
    Ok(Json(ItemsResponse { items }))
}

async fn get_item(
    State(catalog): State<SharedCatalog>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("id must be an integer".to_string()))?;

    let item = blocking(&catalog, move |c| c.get_item(id)).await?;
    Ok(Json(item))
}

async fn get_image(
    State(catalog): State<SharedCatalog>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let path = blocking(&catalog, move |c| c.get_image_path(&filename)).await?;
    let is_placeholder = path == catalog.image_store().default_image_path();

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Default image missing");
            return Err(CatalogError::ImageNotFound(path).into());
        }
        Err(e) => return Err(CatalogError::Io { path, source: e }.into()),
    };

    info!(path = %path.display(), "returned image");

    // content-addressed blobs never change; the placeholder might
    let cache = if is_placeholder { "no-cache" } else { IMMUTABLE_CACHE };
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, cache),
        ],
        bytes,
    )
        .into_response())
}
