use crate::{
    errors::ServiceError, handlers::AppState, services::fulfillment::Deliverable,
};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DownloadQuery {
    /// Order the delivery belongs to
    #[serde(alias = "orderId")]
    pub order_id: Uuid,
    /// Zero-based file index
    pub i: Option<usize>,
    /// `1` returns a manifest of file names instead of streaming
    pub list: Option<String>,
}

/// Download proxy for digital deliveries.
///
/// `list=1` answers a manifest of available files without URLs; otherwise
/// the file at index `i` (default 0) is streamed through the server with a
/// sanitized attachment filename, keeping the upstream storage location
/// out of client view.
#[utoipa::path(
    get,
    path = "/api/v1/downloads",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Manifest or file stream"),
        (status = 400, description = "Invalid file index", body = crate::errors::ErrorResponse),
        (status = 404, description = "No delivery for order", body = crate::errors::ErrorResponse),
        (status = 500, description = "Deliverable has no file URL", body = crate::errors::ErrorResponse)
    ),
    tag = "Downloads"
)]
#[instrument(skip(state))]
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ServiceError> {
    let delivery = state
        .services
        .deliveries
        .find_by_order(query.order_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("No delivery found for order {}", query.order_id))
        })?;

    let links: Vec<Deliverable> = serde_json::from_value(delivery.download_links.clone())?;

    if is_truthy(query.list.as_deref()) {
        let files: Vec<_> = links
            .iter()
            .enumerate()
            .map(|(index, link)| {
                json!({
                    "index": index,
                    "name": link.name,
                    "description": link.description,
                })
            })
            .collect();
        return Ok(Json(json!({
            "order_id": query.order_id,
            "files": files,
        }))
        .into_response());
    }

    let index = query.i.unwrap_or(0);
    let link = links
        .get(index)
        .ok_or_else(|| ServiceError::BadRequest(format!("invalid file index {}", index)))?;

    if link.url.trim().is_empty() {
        return Err(ServiceError::InternalError(format!(
            "deliverable {} has no file URL",
            index
        )));
    }

    let upstream = state
        .http
        .get(&link.url)
        .send()
        .await
        .map_err(|e| ServiceError::InternalError(format!("file fetch failed: {}", e)))?;

    if !upstream.status().is_success() {
        return Err(ServiceError::InternalError(format!(
            "file fetch returned status {}",
            upstream.status()
        )));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let filename = sanitize_filename(&file_name_for(link));
    info!(order_id = %query.order_id, index, filename = %filename, "streaming deliverable");

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ServiceError::InternalError(e.to_string()))?;

    let disposition = format!("attachment; filename=\"{}\"", filename);
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok(response)
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// The attachment name: the URL's last path segment when it has one, the
/// deliverable name otherwise.
fn file_name_for(link: &Deliverable) -> String {
    link.url
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && segment.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| link.name.clone())
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

pub fn download_routes() -> Router<AppState> {
    Router::new().route("/", get(download))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, url: &str) -> Deliverable {
        Deliverable {
            name: name.to_string(),
            url: url.to_string(),
            description: None,
        }
    }

    #[test]
    fn file_name_prefers_the_url_segment() {
        let l = link("Bermuda", "https://x.test/downloads/BERMUDA.zip");
        assert_eq!(file_name_for(&l), "BERMUDA.zip");
    }

    #[test]
    fn file_name_falls_back_to_the_deliverable_name() {
        let l = link("Atendimento via WhatsApp", "https://wa.me/5511999999999");
        assert_eq!(file_name_for(&l), "Atendimento via WhatsApp");
    }

    #[test]
    fn filenames_are_sanitized_for_the_header() {
        assert_eq!(sanitize_filename("BERMUDA.zip"), "BERMUDA.zip");
        assert_eq!(
            sanitize_filename("mapa \"novo\"/..\\x.zip"),
            "mapa__novo____x.zip"
        );
    }

    #[test]
    fn list_flag_accepts_one_and_true() {
        assert!(is_truthy(Some("1")));
        assert!(is_truthy(Some("true")));
        assert!(!is_truthy(Some("0")));
        assert!(!is_truthy(None));
    }
}
