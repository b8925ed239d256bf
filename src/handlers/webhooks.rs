use crate::{errors::ServiceError, handlers::AppState};
use axum::{body::Bytes, extract::State, http::HeaderMap, response::IntoResponse, Json};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Inbound gateway event shape: `{type, data: {id}}`.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: Option<String>,
    data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    id: Option<serde_json::Value>,
}

/// Payment notification webhook.
///
/// Always acknowledges recognized or ignorable events with 200 so the
/// gateway stops retrying; only a failed upstream payment fetch answers
/// 500.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    request_body = String,
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Malformed event payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid signature", body = crate::errors::ErrorResponse),
        (status = 500, description = "Upstream payment fetch failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    // Verify signature if configured
    if let Some(secret) = state.config.webhook_secret.clone() {
        let tolerance = state.config.webhook_tolerance_secs.unwrap_or(300);
        if !verify_signature(&headers, &body, &secret, tolerance) {
            warn!("webhook signature verification failed");
            return Err(ServiceError::Unauthorized(
                "invalid webhook signature".to_string(),
            ));
        }
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::BadRequest(format!("invalid json: {}", e)))?;

    let event_type = event.event_type.unwrap_or_default();

    let payment_id = if event_type == "payment" {
        match event.data.and_then(|d| d.id) {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(ServiceError::BadRequest(
                    "payment event carries no data.id".to_string(),
                ))
            }
        }
    } else {
        String::new()
    };

    let outcome = state
        .services
        .reconciliation
        .process(&event_type, &payment_id)
        .await
        .map_err(|err| {
            // The webhook contract is 500 on upstream fetch failure; the
            // 502 mapping belongs to the checkout surface.
            warn!(payment_id = %payment_id, error = %err, "payment fetch failed");
            ServiceError::InternalError(format!("failed to fetch payment {}: {}", payment_id, err))
        })?;

    info!(status = %outcome.status_label(), "webhook processed");
    Ok(Json(json!({
        "received": true,
        "status": outcome.status_label(),
    })))
}

/// Generic HMAC verification over `x-signature: ts=<ts>,v1=<hex>` headers;
/// the signed payload is `{ts}.{body}`.
fn verify_signature(headers: &HeaderMap, payload: &Bytes, secret: &str, tolerance_secs: u64) -> bool {
    let Some(signature) = headers.get("x-signature").and_then(|h| h.to_str().ok()) else {
        return false;
    };

    let mut ts = "";
    let mut v1 = "";
    for part in signature.split(',') {
        let mut it = part.trim().splitn(2, '=');
        match (it.next(), it.next()) {
            (Some("ts"), Some(val)) => ts = val,
            (Some("v1"), Some(val)) => v1 = val,
            _ => {}
        }
    }
    if ts.is_empty() || v1.is_empty() {
        return false;
    }

    if let Ok(ts_i) = ts.parse::<i64>() {
        let now = chrono::Utc::now().timestamp();
        if (now - ts_i).unsigned_abs() > tolerance_secs {
            return false;
        }
    }

    let signed = format!("{}.{}", ts, std::str::from_utf8(payload).unwrap_or(""));
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(signed.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());
    constant_time_eq(&expected, v1)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signed_headers(secret: &str, body: &str, ts: i64) -> HeaderMap {
        let signed = format!("{}.{}", ts, body);
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed.as_bytes());
        let v1 = hex::encode(mac.finalize().into_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-signature",
            HeaderValue::from_str(&format!("ts={},v1={}", ts, v1)).unwrap(),
        );
        headers
    }

    #[test]
    fn accepts_a_valid_signature() {
        let body = r#"{"type":"payment","data":{"id":"1"}}"#;
        let ts = chrono::Utc::now().timestamp();
        let headers = signed_headers("s3cret", body, ts);
        assert!(verify_signature(
            &headers,
            &Bytes::from(body),
            "s3cret",
            300
        ));
    }

    #[test]
    fn rejects_a_tampered_body() {
        let body = r#"{"type":"payment","data":{"id":"1"}}"#;
        let ts = chrono::Utc::now().timestamp();
        let headers = signed_headers("s3cret", body, ts);
        assert!(!verify_signature(
            &headers,
            &Bytes::from(r#"{"type":"payment","data":{"id":"2"}}"#),
            "s3cret",
            300
        ));
    }

    #[test]
    fn rejects_a_stale_timestamp() {
        let body = r#"{"type":"payment","data":{"id":"1"}}"#;
        let ts = chrono::Utc::now().timestamp() - 3600;
        let headers = signed_headers("s3cret", body, ts);
        assert!(!verify_signature(
            &headers,
            &Bytes::from(body),
            "s3cret",
            300
        ));
    }

    #[test]
    fn rejects_when_header_is_missing() {
        let headers = HeaderMap::new();
        assert!(!verify_signature(
            &headers,
            &Bytes::from_static(b"{}"),
            "s3cret",
            300
        ));
    }
}
